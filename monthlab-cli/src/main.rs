//! Monthlab CLI: monthly OHLC + moving-average windows from daily prices.
//!
//! Commands:
//! - `run`: load a daily CSV, aggregate per instrument and month, write one
//!   CSV per instrument with its last 24 months
//! - `generate`: write a deterministic synthetic daily dataset

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use monthlab_runner::{
    generate_dataset, run_pipeline, write_dataset_csv, PipelineConfig, RejectPolicy, RunSummary,
};

#[derive(Parser)]
#[command(
    name = "monthlab",
    about = "Monthlab CLI: monthly OHLC bars with SMA/EMA indicators"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a daily CSV into per-instrument monthly CSVs.
    Run {
        /// Daily input CSV (ticker,date,open,high,low,close).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Path to a TOML config file. Command-line flags override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory. Defaults to the current directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Output file name prefix. Defaults to "result_".
        #[arg(long)]
        prefix: Option<String>,

        /// Fail on the first malformed row instead of skipping it.
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Also write manifest.json with hashes and counts.
        #[arg(long, default_value_t = false)]
        manifest: bool,
    },
    /// Write a synthetic daily dataset (weekday random walk per symbol).
    Generate {
        /// Symbols to generate (e.g., --symbols SPY QQQ AAPL).
        #[arg(long, required = true, num_args = 1..)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to 2015-01-01.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Output CSV path.
        #[arg(long, default_value = "daily.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            config,
            output_dir,
            prefix,
            strict,
            manifest,
        } => run_cmd(input, config, output_dir, prefix, strict, manifest),
        Commands::Generate {
            symbols,
            start,
            end,
            output,
        } => generate_cmd(symbols, start, end, output),
    }
}

fn run_cmd(
    input: Option<PathBuf>,
    config_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    prefix: Option<String>,
    strict: bool,
    manifest: bool,
) -> Result<()> {
    let mut config = match (config_path, input.clone()) {
        (Some(path), _) => PipelineConfig::from_file(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        (None, Some(input)) => PipelineConfig::new(input),
        (None, None) => bail!("one of --input or --config is required"),
    };

    if let Some(input) = input {
        config.input = input;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(prefix) = prefix {
        config.file_prefix = prefix;
    }
    if strict {
        config.reject_policy = RejectPolicy::Strict;
    }
    if manifest {
        config.write_manifest = true;
    }

    let summary = run_pipeline(&config)?;
    print_summary(&summary);

    if !summary.all_succeeded() {
        for failure in &summary.failures {
            eprintln!("Error for {}: {}", failure.instrument_id, failure.error);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn generate_cmd(
    symbols: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    output: PathBuf,
) -> Result<()> {
    let start_date =
        NaiveDate::parse_from_str(start.as_deref().unwrap_or("2015-01-01"), "%Y-%m-%d")?;

    let end_date = end
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    if end_date < start_date {
        bail!("--end {end_date} is before --start {start_date}");
    }

    let sym_refs: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();
    let data = generate_dataset(&sym_refs, start_date, end_date);
    if data.is_empty() {
        warn!("date range contains no weekdays; writing header only");
    }

    let file = std::fs::File::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    write_dataset_csv(&data, file)?;
    info!(rows = data.len(), output = %output.display(), "synthetic dataset written");

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Rows read: {}  rejected: {}  inconsistent: {}",
        summary.load.rows_read, summary.load.rows_rejected, summary.load.inconsistent_rows
    );
    for outcome in &summary.instruments {
        let path = outcome
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        println!(
            "  {:<10} {:>4} months  {:>3} rows  {}",
            outcome.instrument_id, outcome.monthly_records, outcome.rows_written, path
        );
    }
    println!(
        "Done: {} instruments written, {} failed",
        summary.instruments.len(),
        summary.failures.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_takes_symbols_flag() {
        let cli = Cli::try_parse_from(["monthlab", "generate", "--symbols", "SPY", "QQQ"]).unwrap();
        match cli.command {
            Commands::Generate { symbols, output, .. } => {
                assert_eq!(symbols, vec!["SPY", "QQQ"]);
                assert_eq!(output, PathBuf::from("daily.csv"));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn generate_requires_symbols() {
        assert!(Cli::try_parse_from(["monthlab", "generate"]).is_err());
        assert!(Cli::try_parse_from(["monthlab", "generate", "SPY"]).is_err());
    }
}
