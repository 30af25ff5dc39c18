use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use selectivity::data::{loader, sample};
use selectivity::selectivity::{EmptyPolicy, Estimator, Predicate};

/// Report how many rows of a dataset satisfy two predicates, alone and
/// combined with AND / OR.
#[derive(Parser, Debug)]
#[command(name = "selectivity")]
#[command(about = "Predicate selectivity estimator", long_about = None)]
struct Args {
    /// Dataset to read (.parquet, .csv or .json); the built-in sample when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Condition A
    #[arg(short = 'a', long = "a", default_value = "A > 5")]
    condition_a: String,

    /// Condition B
    #[arg(short = 'b', long = "b", default_value = "B == 6")]
    condition_b: String,

    /// Report 0.0 for an empty dataset instead of failing
    #[arg(long)]
    empty_as_zero: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let dataset = match &args.input {
        Some(path) => loader::load_file(path)?,
        None => sample::sample_dataset().context("building sample dataset")?,
    };

    let a = Predicate::parse(&args.condition_a).context("parsing condition A")?;
    let b = Predicate::parse(&args.condition_b).context("parsing condition B")?;

    let policy = if args.empty_as_zero {
        EmptyPolicy::Zero
    } else {
        EmptyPolicy::Error
    };
    let report = Estimator::new(policy).report(&dataset, ("A", &a), ("B", &b))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}
