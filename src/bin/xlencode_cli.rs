//! CLI tool for xlencode - encodes the message column of a spreadsheet
//!
//! Usage:
//!   xlencode_cli <input.xlsx>               # Writes Encoded-<input>.xlsx next to the input
//!   xlencode_cli <input.xlsx> -o out.xlsx   # Writes to a chosen path
//!   xlencode_cli <input.csv> --summary      # Also prints a JSON summary to stdout

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xlencode::pipeline::{process, Outcome};

/// URL-encode the message column of a spreadsheet and count SMS segments
#[derive(Parser)]
#[command(name = "xlencode_cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input XLSX or CSV file
    input: PathBuf,

    /// Output path (defaults to the derived file name next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a JSON summary of the run to stdout
    #[arg(long)]
    summary: bool,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sheet_name: Option<&'a str>,
    data_rows: usize,
    encoded_rows: usize,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(log_filter(cli.verbose, rust_log.as_deref()))
        .try_init();

    let data = fs::read(&cli.input)
        .with_context(|| format!("Error reading {}", cli.input.display()))?;
    let file_name = cli
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let outcome = process(&data, &file_name)
        .with_context(|| format!("Error encoding {}", cli.input.display()))?;

    match outcome {
        Outcome::NoMessageData => {
            eprintln!("No data available in the 3rd column (Message column) to encode.");
            if cli.summary {
                print_summary(&Summary {
                    status: "noMessageData",
                    output: None,
                    sheet_name: None,
                    data_rows: 0,
                    encoded_rows: 0,
                })?;
            }
            Ok(ExitCode::from(2))
        }
        Outcome::Processed(file) => {
            let output = cli.output.clone().unwrap_or_else(|| {
                cli.input
                    .parent()
                    .unwrap_or_else(|| Path::new(""))
                    .join(&file.file_name)
            });
            fs::write(&output, &file.bytes)
                .with_context(|| format!("Error writing {}", output.display()))?;
            eprintln!("Written: {}", output.display());

            if cli.summary {
                print_summary(&Summary {
                    status: "processed",
                    output: Some(&output),
                    sheet_name: Some(&file.sheet_name),
                    data_rows: file.data_rows,
                    encoded_rows: file.encoded_rows,
                })?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// RUST_LOG directives, or WARN when unset. `--verbose` raises the default to DEBUG.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let filter = rust_log.map_or_else(|| EnvFilter::new("warn"), EnvFilter::new);
    if verbose {
        filter.add_directive(Level::DEBUG.into())
    } else {
        filter
    }
}

fn print_summary(summary: &Summary<'_>) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Error serializing summary")?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(json.as_bytes())?;
    writeln!(stdout)?;
    Ok(())
}
