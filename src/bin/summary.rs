//! CleanFi Summary - CLI tool for summarizing spending in a bank export.

use clap::Parser;
use cleanfi::{Pipeline, PipelineConfig, RawTable, Result, Summary};
use std::fs::File;
use std::io;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cleanfi_summary")]
#[command(about = "Summarize income and spending by category", long_about = None)]
struct Cli {
    /// Input file path (or stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// JSON file replacing the built-in alias and category tables
    #[arg(long)]
    rules: Option<String>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.rules {
        Some(ref path) => PipelineConfig::from_json_reader(File::open(path)?)?,
        None => PipelineConfig::default(),
    };

    let raw = match cli.input {
        Some(ref path) => RawTable::from_read(&mut File::open(path)?)?,
        None => RawTable::from_read(&mut io::stdin())?,
    };

    let clean = Pipeline::new(config).clean(&raw)?;
    let summary = Summary::from_table(&clean.table);

    print!("{}", summary);

    Ok(())
}
