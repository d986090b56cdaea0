use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use confquill::config::Config;
use confquill::tables::{self, Options, Record, Source, Table};

/// confquill - Query configuration files as flat rows
#[derive(Parser)]
#[command(name = "confquill")]
#[command(version)]
#[command(
    about = "Reads YAML, JSON, TOML, XML and INI files and prints their rows as JSON lines",
    long_about = None
)]
struct Cli {
    /// Table to read, or `tables` to list them
    table: String,

    /// File, directory or glob pattern to read (repeatable; overrides `paths` from the config file)
    #[arg(short, long = "path")]
    paths: Vec<String>,

    /// Read exactly this file, skipping path resolution
    #[arg(short, long, conflicts_with = "paths")]
    file: Option<PathBuf>,

    /// Config file (default: ~/.config/confquill/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    // Logs go to stderr so stdout stays one JSON record per line
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if cli.table == "tables" {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for table in Table::ALL {
            writeln!(out, "{:<16} {}", table.name(), table.description())?;
        }
        return Ok(());
    }

    let table: Table = cli.table.parse().map_err(anyhow::Error::msg)?;
    let source = match cli.file {
        Some(file) => Source::File(file),
        None if !cli.paths.is_empty() => Source::Paths(cli.paths),
        None => Source::Paths(config.paths.clone()),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut write_error: Option<anyhow::Error> = None;

    let report = tables::run(table, &source, &Options::from(&config), |record| {
        if write_error.is_none() {
            if let Err(e) = write_record(&mut out, &record) {
                write_error = Some(e);
            }
        }
    })?;
    out.flush().context("Failed to write output")?;
    if let Some(e) = write_error {
        return Err(e);
    }

    if !report.is_success() {
        for failure in &report.failures {
            eprintln!("{}", failure);
        }
        anyhow::bail!(
            "{} of {} files could not be read",
            report.failures.len(),
            report.files
        );
    }

    Ok(())
}

fn write_record<W: Write>(out: &mut W, record: &Record) -> Result<()> {
    serde_json::to_writer(&mut *out, record).context("Failed to serialize record")?;
    out.write_all(b"\n").context("Failed to write output")?;
    Ok(())
}
