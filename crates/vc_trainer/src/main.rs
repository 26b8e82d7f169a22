//! VC acquisition model builder CLI
//!
//! Trains the random forest on the cleaned dataset produced by
//! `cleanup-data` and writes the model artifact with its hash.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;
use vc_core::{init_logging, load_layered, LoggingConfig, PathsConfig};
use vc_trainer::{ModelBuilder, TrainerConfig};

#[derive(Parser, Debug)]
#[command(name = "create-model")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train the VC acquisition random forest", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cleaned input CSV (defaults to paths.cleaned_output)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Model artifact path (defaults to paths.model_output)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed for resampling, splitting and tree growth
    #[arg(long)]
    seed: Option<u64>,

    /// Number of trees
    #[arg(long)]
    trees: Option<usize>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    paths: PathsConfig,
    logging: LoggingConfig,
    trainer: TrainerConfig,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings: Settings =
        load_layered(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&settings.logging, args.verbose)?;

    if let Some(seed) = args.seed {
        settings.trainer.seed = seed;
    }
    if let Some(trees) = args.trees {
        settings.trainer.forest.n_trees = trees;
    }
    let input = args.input.unwrap_or(settings.paths.cleaned_output);
    let output = args.output.unwrap_or(settings.paths.model_output);

    info!("VC Model Builder v{}", env!("CARGO_PKG_VERSION"));
    info!("═══════════════════════════════════════════");
    let trainer = &settings.trainer;
    info!("Training configuration:");
    info!("  Seed: {}", trainer.seed);
    info!("  Samples per class: {}", trainer.samples_per_class);
    info!("  Trees: {}", trainer.forest.n_trees);
    match trainer.forest.max_depth {
        Some(depth) => info!("  Max depth: {}", depth),
        None => info!("  Max depth: unlimited"),
    }
    info!("  Max features: {:?}", trainer.forest.max_features);

    let builder = ModelBuilder::new(settings.trainer);
    let (outcome, saved) = builder
        .run(&input, &output)
        .with_context(|| format!("Failed to build model from {}", input.display()))?;

    info!("═══════════════════════════════════════════");
    info!("✓ Training completed successfully");
    info!("  Labeled rows: {}", outcome.labeled_rows);
    info!("  Test accuracy: {:.4}", outcome.test.report.accuracy);
    info!("  Model: {}", saved.model_path.display());
    info!("  Hash: {} ({})", saved.hash_path.display(), saved.hash);
    if let Some(manifest) = &saved.manifest_path {
        info!("  Manifest: {}", manifest.display());
    }

    Ok(())
}
