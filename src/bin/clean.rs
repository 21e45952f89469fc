//! CleanFi Clean - CLI tool for turning a bank export into a clean CSV.

use clap::Parser;
use cleanfi::{CleanTables, Error, Pipeline, PipelineConfig, RawTable, Result};
use std::fs::File;
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cleanfi_clean")]
#[command(about = "Normalize and categorize a bank transaction CSV", long_about = None)]
struct Cli {
    /// Input file path (or stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Output file path (or stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// JSON file replacing the built-in alias and category tables
    #[arg(long)]
    rules: Option<String>,

    /// Write ISO dates instead of M/D/Y
    #[arg(long)]
    canonical: bool,

    /// Do not reuse a raw column for more than one field
    #[arg(long = "exclusive-columns")]
    exclusive_columns: bool,

    /// Print the column mapping to stderr
    #[arg(long = "show-mapping")]
    show_mapping: bool,

    /// List the category names and exit
    #[arg(long = "list-categories")]
    list_categories: bool,
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        if let Error::MissingRequiredColumns { ref mapping, .. } = e {
            eprintln!("\nDetected mapping:\n{}", mapping);
            std::process::exit(2);
        }
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.rules {
        Some(ref path) => PipelineConfig::from_json_reader(File::open(path)?)?,
        None => PipelineConfig::default(),
    };
    if cli.exclusive_columns {
        config.exclusive_columns = true;
    }
    let pipeline = Pipeline::new(config);

    if cli.list_categories {
        for name in pipeline.category_options() {
            println!("{}", name);
        }
        return Ok(());
    }

    let raw = if let Some(ref input_path) = cli.input {
        let mut file = File::open(input_path)?;
        read_input(&mut file)?
    } else {
        let mut stdin = io::stdin();
        read_input(&mut stdin)?
    };

    let clean = pipeline.clean(&raw)?;
    if cli.show_mapping {
        eprintln!("{}", clean.mapping);
    }

    if let Some(ref output_path) = cli.output {
        let mut file = File::create(output_path)?;
        write_output(&mut file, &clean, cli.canonical)?;
    } else {
        let mut stdout = io::stdout();
        write_output(&mut stdout, &clean, cli.canonical)?;
    }

    Ok(())
}

fn read_input<R: Read>(reader: &mut R) -> Result<RawTable> {
    RawTable::from_read(reader)
}

fn write_output<W: Write>(writer: &mut W, clean: &CleanTables, canonical: bool) -> Result<()> {
    if canonical {
        clean.table.write_to(writer)
    } else {
        clean.display.write_to(writer)
    }
}
