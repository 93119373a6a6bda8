use std::process;

use anyhow::Result;

pub fn run(expr: &str) -> Result<()> {
    match brabbel::parse(expr) {
        Ok(tree) => {
            println!("{tree}");
            let vars = tree.variables();
            if !vars.is_empty() {
                println!("variables: {}", vars.join(", "));
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("  {}", e.input);
            let column = e.input.get(..e.offset).map_or(0, |s| s.chars().count());
            eprintln!("  {}^", " ".repeat(column));
            process::exit(2);
        }
    }
}
