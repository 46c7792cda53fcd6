//! Box 3 Engine CLI
//!
//! Reads a household snapshot (JSON) and writes the method comparison as JSON

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use box3_engine::household::load_household;
use box3_engine::{ComparisonEngine, RateTable};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "box3", version, about = "Compare statutory and actual-return Box 3 tax for a household")]
struct Args {
    /// Household snapshot JSON file
    household: PathBuf,

    /// Directory with box3_rates.csv and legacy_brackets.csv (default: built-in table)
    #[arg(long, value_name = "DIR")]
    rates: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rates = match &args.rates {
        Some(dir) => RateTable::from_csv_path(dir)
            .with_context(|| format!("loading rate table from {}", dir.display()))?,
        None => RateTable::statutory(),
    };
    let engine = ComparisonEngine::new(rates);

    let household = load_household(&args.household)
        .with_context(|| format!("reading household from {}", args.household.display()))?;
    let result = engine
        .compare(&household)
        .with_context(|| format!("comparing Box 3 methods for {}", args.household.display()))?;

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path).with_context(|| format!("creating {}", path.display()))?),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);

    if args.compact {
        serde_json::to_writer(&mut writer, &result)?;
    } else {
        serde_json::to_writer_pretty(&mut writer, &result)?;
    }
    writeln!(writer)?;
    writer.flush()?;

    if let Some(path) = &args.output {
        log::info!("Wrote comparison to {}", path.display());
    }
    Ok(())
}
