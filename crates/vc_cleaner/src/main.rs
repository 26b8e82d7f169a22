//! VC dataset cleanup CLI
//!
//! Turns the raw investments CSV into the cleaned, feature-engineered table
//! consumed by `create-model`.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;
use vc_cleaner::{Cleaner, CleanerConfig};
use vc_core::{init_logging, load_layered, LoggingConfig, PathsConfig};

#[derive(Parser, Debug)]
#[command(name = "cleanup-data")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Clean and feature-engineer the raw VC investments dataset", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Raw input CSV (defaults to paths.raw_input)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Cleaned output CSV (defaults to paths.cleaned_output)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    paths: PathsConfig,
    logging: LoggingConfig,
    cleaner: CleanerConfig,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings: Settings =
        load_layered(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&settings.logging, args.verbose)?;

    let input = args.input.unwrap_or(settings.paths.raw_input);
    let output = args.output.unwrap_or(settings.paths.cleaned_output);

    info!("VC Data Cleaner v{}", env!("CARGO_PKG_VERSION"));
    info!("═══════════════════════════════════════════");

    let cleaner = Cleaner::new(settings.cleaner);
    let summary = cleaner
        .run(&input, &output)
        .with_context(|| format!("Failed to clean {}", input.display()))?;

    info!("═══════════════════════════════════════════");
    info!("✓ Cleanup completed successfully");
    info!("  Input rows: {}", summary.input_rows);
    info!(
        "  Output: {} rows x {} columns",
        summary.output_rows, summary.output_columns
    );

    Ok(())
}
