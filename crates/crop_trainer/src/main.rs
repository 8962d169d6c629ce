//! Crop recommendation trainer CLI
//!
//! Trains the random forest and writes the artifact set consumed by `croprec`.

use anyhow::{Context, Result};
use clap::Parser;
use croprec_core::Predictor;
use croprec_trainer::{insights, train_and_persist, ForestParams, TrainingParams};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "croprec-train")]
#[command(author = "Croprec Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deterministic random forest trainer for crop recommendation", long_about = None)]
struct Args {
    /// Input CSV dataset (N,P,K,temperature,humidity,ph,rainfall,label)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the artifact set
    #[arg(short, long, default_value = "models/crop")]
    output: PathBuf,

    /// Number of trees in the forest
    #[arg(long, default_value = "100")]
    trees: usize,

    /// Maximum tree depth (unbounded when omitted)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Minimum samples required to split a node
    #[arg(long, default_value = "2")]
    min_samples_split: usize,

    /// Minimum samples per leaf
    #[arg(long, default_value = "1")]
    min_samples_leaf: usize,

    /// Features examined per split (floor(sqrt(7)) when omitted)
    #[arg(long)]
    max_features: Option<usize>,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value = "0.2")]
    test_ratio: f64,

    /// Seed for the split and the forest
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Crop Recommendation Trainer v{}", env!("CARGO_PKG_VERSION"));

    let params = TrainingParams {
        forest: ForestParams {
            n_trees: args.trees,
            max_depth: args.max_depth,
            min_samples_split: args.min_samples_split,
            min_samples_leaf: args.min_samples_leaf,
            max_features: args.max_features,
            seed: args.seed,
        },
        test_ratio: args.test_ratio,
    };

    info!("Training configuration:");
    info!("  Trees: {}", params.forest.n_trees);
    info!(
        "  Max depth: {}",
        params
            .forest
            .max_depth
            .map_or_else(|| "unbounded".to_string(), |d| d.to_string())
    );
    info!(
        "  Min samples split/leaf: {}/{}",
        params.forest.min_samples_split, params.forest.min_samples_leaf
    );
    info!("  Test ratio: {}", params.test_ratio);
    info!("  Seed: {}", params.forest.seed);

    let manifest = train_and_persist(&args.input, &args.output, params)
        .with_context(|| format!("Training on {} failed", args.input.display()))?;

    info!("Training complete!");
    info!("  Labels: {}", manifest.labels.join(", "));
    info!("  Classifier digest: {}", manifest.digests.classifier);

    let predictor = Predictor::load(&args.output)
        .context("Failed to reload the saved artifacts")?;
    for (name, importance) in insights::feature_importance_ranking(&predictor.artifacts().forest) {
        info!("  Importance {:<12} {:.4}", name, importance);
    }

    println!("Model trained successfully! Accuracy: {:.2}", manifest.training.accuracy);

    Ok(())
}
