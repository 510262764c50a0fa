//! Pharmacy Report CLI
//!
//! A batch aggregator that reads prescription records from CSV and
//! writes a per-drug cost and prescriber report.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- input/itcont.txt > top_cost_drug.txt
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//!   (skipped records are reported at warn level)

use clap::Parser;
use pharmacy_report::{ReportConfig, ReportEngine, ReportError, Result, ValidationRule};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Input file of delimited prescription records
    input: PathBuf,

    /// Output file; writes to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Validation rule applied to each record
    #[arg(long, value_enum, default_value_t = ValidationRule::Permissive)]
    rule: ValidationRule,

    /// Stop after this many input records
    #[arg(long)]
    max_records: Option<u64>,

    /// Field delimiter for input and output
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let delimiter =
        u8::try_from(args.delimiter).map_err(|_| ReportError::Delimiter(args.delimiter))?;
    let config = ReportConfig {
        rule: args.rule,
        max_records: args.max_records,
        delimiter,
    };

    let file = File::open(&args.input)?;
    let reader = BufReader::new(file);

    let mut engine = ReportEngine::new(config);
    engine.process_csv(reader)?;

    match args.output {
        Some(path) => {
            let out = File::create(path)?;
            engine.write_output(BufWriter::new(out))?;
        }
        None => {
            let stdout = io::stdout();
            let handle = stdout.lock();
            engine.write_output(handle)?;
        }
    }

    Ok(())
}
