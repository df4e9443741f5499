//! Train a placeholder fraud model on uniform random data

use anyhow::{Context, Result};
use clap::Parser;
use fraudguard_node::ai_engine::{ForestParams, RandomForest};
use log::info;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(name = "train_model")]
#[clap(about = "Train a dummy fraud classifier on random synthetic data")]
struct Args {
    /// Where to write the model (.json for JSON, bincode otherwise)
    #[clap(long, default_value = "fraud_model.bin")]
    output: PathBuf,

    /// Number of synthetic samples
    #[clap(long, default_value = "1000")]
    samples: usize,

    /// Features per sample
    #[clap(long, default_value = "4")]
    features: usize,

    /// Number of trees
    #[clap(long, default_value = "100")]
    trees: usize,

    /// Maximum tree depth
    #[clap(long)]
    max_depth: Option<u16>,

    /// Seed for data generation and training
    #[clap(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let x = Array2::from_shape_fn((args.samples, args.features), |_| rng.gen::<f64>());
    let y = Array1::from_shape_fn(args.samples, |_| rng.gen_range(0..=1u8));

    let params = ForestParams {
        n_estimators: args.trees,
        max_depth: args.max_depth,
        seed: args.seed,
        ..ForestParams::default()
    };

    info!(
        "Training {} trees on {} samples x {} features",
        args.trees, args.samples, args.features
    );
    let forest = RandomForest::fit(&x, &y, &params).context("training failed")?;

    forest
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!("Wrote {}", args.output.display());
    info!("Dummy model saved.");
    Ok(())
}
