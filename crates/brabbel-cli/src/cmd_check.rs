use std::path::PathBuf;
use std::process;

use anyhow::Result;

use brabbel::Phase;
use brabbel_config::FormConfig;

use crate::tracing_init::init_tracing;
use crate::values::load_context;

pub fn run(config: PathBuf, values: Option<PathBuf>, set: Vec<String>, phase: Phase) -> Result<()> {
    let config_path = config
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("config path '{}': {e}", config.display()))?;
    let form_config = FormConfig::load(&config_path)?;
    let base_dir = config_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("config path has no parent directory"))?;

    let _guard = init_tracing(&form_config.logging, base_dir)?;
    tracing::debug!(
        domain = "sys",
        config = %config_path.display(),
        fields = form_config.form.fields.len(),
        "rules file loaded"
    );

    let submitted = load_context(values.as_deref(), &set)?;
    let form = &form_config.form;
    let mut ctx = form.default_values(&submitted);
    ctx.extend(submitted);

    let visible = form.visible_fields(&ctx);
    println!("visible: {}", visible.join(", "));

    let report = form.validate(phase, &ctx);
    print!("{report}");
    eprintln!(
        "{} error(s), {} warning(s)",
        report.error_count(),
        report.warning_count()
    );

    if !report.is_valid() {
        process::exit(1);
    }
    Ok(())
}
