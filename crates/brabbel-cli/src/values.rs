use std::path::Path;

use anyhow::{Context as _, Result};

use brabbel::{Context, Value};

/// Build the evaluation context: the values file first, then `--set`
/// overrides. `--set` values stay raw strings, as submitted form data does.
pub fn load_context(values: Option<&Path>, sets: &[String]) -> Result<Context> {
    let mut ctx = match values {
        Some(path) => load_values_file(path)?,
        None => Context::new(),
    };
    for arg in sets {
        let (name, value) = arg.split_once('=').ok_or_else(|| {
            anyhow::anyhow!("invalid --set format: expected NAME=VALUE, got '{arg}'")
        })?;
        ctx.insert(name.trim(), Value::Str(value.to_string()));
    }
    Ok(ctx)
}

/// Read a JSON or TOML document of field values, chosen by extension.
fn load_values_file(path: &Path) -> Result<Context> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match ext {
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON values in {}", path.display())),
        "toml" => toml::from_str(&content)
            .with_context(|| format!("invalid TOML values in {}", path.display())),
        other => anyhow::bail!(
            "unsupported values file '{}': expected .json or .toml, got '.{other}'",
            path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_values_are_raw_strings() {
        let ctx = load_context(None, &["age=21".into(), "name=Ada Lovelace".into()]).unwrap();
        assert_eq!(ctx.get("age"), Some(&Value::Str("21".into())));
        assert_eq!(ctx.get("name"), Some(&Value::Str("Ada Lovelace".into())));
    }

    #[test]
    fn set_without_equals_is_rejected() {
        let err = load_context(None, &["age".into()]).unwrap_err();
        assert!(err.to_string().contains("NAME=VALUE"));
    }

    #[test]
    fn json_values_with_set_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.json");
        std::fs::write(&path, r#"{"age": 17, "tags": ["a"], "note": null}"#).unwrap();
        let ctx = load_context(Some(&path), &["age=30".into()]).unwrap();
        assert_eq!(ctx.get("age"), Some(&Value::Str("30".into())));
        assert_eq!(ctx.get("tags"), Some(&Value::from(vec!["a"])));
        assert_eq!(ctx.get("note"), Some(&Value::Null));
    }

    #[test]
    fn toml_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.toml");
        std::fs::write(&path, "age = 17\nratio = 0.5\nok = true\n").unwrap();
        let ctx = load_context(Some(&path), &[]).unwrap();
        assert_eq!(ctx.get("age"), Some(&Value::Int(17)));
        assert_eq!(ctx.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(ctx.get("ok"), Some(&Value::Bool(true)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.yaml");
        std::fs::write(&path, "age: 1").unwrap();
        let err = load_context(Some(&path), &[]).unwrap_err();
        assert!(err.to_string().contains(".yaml"));
    }
}
