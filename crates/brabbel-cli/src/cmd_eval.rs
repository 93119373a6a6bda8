use std::path::PathBuf;
use std::process;

use anyhow::Result;

use crate::values::load_context;

pub fn run(expr: &str, values: Option<PathBuf>, set: Vec<String>) -> Result<()> {
    let tree = match brabbel::parse(expr) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    };
    let ctx = load_context(values.as_deref(), &set)?;

    match brabbel::evaluate_value(&tree, &ctx) {
        Ok(value) => {
            println!("{value}");
            Ok(())
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
