use std::io::Write;

use brabbel::{Context, Phase};
use brabbel_config::{FormConfig, LogFormat};

#[test]
fn load_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[logging]
format = "json"
file = "logs/brabbel.log"

[[field]]
name = "email"
required = true

[[field.rule]]
expr = "'@' in $email"
msg = "Not an email address"
"#
    )
    .unwrap();

    let cfg = FormConfig::load(file.path()).unwrap();
    assert_eq!(cfg.logging.format, LogFormat::Json);
    assert_eq!(
        cfg.logging.file.as_deref(),
        Some(std::path::Path::new("logs/brabbel.log"))
    );

    let report = cfg
        .form
        .validate(Phase::Post, &Context::new().with("email", "nobody"));
    assert_eq!(report.errors["email"], vec!["Not an email address"]);
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = FormConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn invalid_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[[field]]\nname = \"a\"\nwhen = \"$a ==\"\n").unwrap();
    let err = FormConfig::load(&path).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("broken.toml"), "{chain}");
    assert!(chain.contains("field 'a'"), "{chain}");
}

#[test]
fn submitted_values_override_defaults() {
    let cfg: FormConfig = r#"
[[field]]
name = "country"
default = "DE"

[[field]]
name = "zip"
when = "$country == 'DE'"
required = true
"#
    .parse()
    .unwrap();

    let submitted = Context::new().with("zip", "");
    let mut ctx = cfg.form.default_values(&submitted);
    ctx.extend(submitted);
    let report = cfg.form.validate(Phase::Pre, &ctx);
    assert!(report.errors.contains_key("zip"));

    let submitted = Context::new().with("country", "FR").with("zip", "");
    let mut ctx = cfg.form.default_values(&submitted);
    ctx.extend(submitted);
    assert!(cfg.form.validate(Phase::Pre, &ctx).is_valid());
}
