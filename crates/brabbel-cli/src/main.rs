use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use brabbel::Phase;

mod cmd_check;
mod cmd_eval;
mod cmd_parse;
mod tracing_init;
mod values;

#[derive(Parser)]
#[command(name = "brabbel", about = "Rule expression engine for form configurations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an expression and print its canonical form
    Parse {
        /// Expression text, e.g. "bool($age) and $age >= 18"
        expr: String,
    },

    /// Evaluate an expression against a set of values
    Eval {
        /// Expression text
        expr: String,

        /// JSON or TOML file with field values
        #[arg(long)]
        values: Option<PathBuf>,

        /// Field values in NAME=VALUE format (raw strings)
        #[arg(long)]
        set: Vec<String>,
    },

    /// Validate values against a rules file
    Check {
        /// Path to the TOML rules file
        #[arg(short, long)]
        config: PathBuf,

        /// JSON or TOML file with field values
        #[arg(long)]
        values: Option<PathBuf>,

        /// Field values in NAME=VALUE format (raw strings)
        #[arg(long)]
        set: Vec<String>,

        /// Which rules to run
        #[arg(long, default_value = "post")]
        phase: Phase,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { expr } => {
            let _guard = tracing_init::init_default()?;
            cmd_parse::run(&expr)?;
        }

        Commands::Eval { expr, values, set } => {
            let _guard = tracing_init::init_default()?;
            cmd_eval::run(&expr, values, set)?;
        }

        Commands::Check {
            config,
            values,
            set,
            phase,
        } => {
            cmd_check::run(config, values, set, phase)?;
        }
    }

    Ok(())
}
