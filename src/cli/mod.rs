//! Command-line parsing for the house price trainer/server.
//!
//! Argument parsing and command dispatch stay separate from the modeling
//! code; `app::run` turns these args into configs for the pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ModelSpec;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hp", version, about = "House price prediction: train, serve, predict")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Train a model and persist the artifact bundle.
    Train(TrainArgs),
    /// Serve predictions over HTTP (JSON API + demo page).
    Serve(ServeArgs),
    /// Predict once from CLI flags and print the JSON response.
    Predict(PredictArgs),
    /// Launch the interactive TUI prediction form.
    Tui(TuiArgs),
}

/// Options for training.
#[derive(Debug, Parser, Clone)]
pub struct TrainArgs {
    /// Train on a local CSV (must contain the six feature columns + SalePrice).
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Skip the dataset download attempt and go straight to synthetic data.
    #[arg(long)]
    pub offline: bool,

    /// Random seed for the split shuffle, synthetic data, and bootstrap.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of rows held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    /// Row count for the synthetic fallback dataset.
    #[arg(long, default_value_t = 1460)]
    pub synthetic_rows: usize,

    /// Which estimator to train.
    #[arg(long, value_enum, default_value_t = ModelSpec::Forest)]
    pub model: ModelSpec,

    /// Number of trees in the forest.
    #[arg(long, default_value_t = 100)]
    pub trees: usize,

    /// Maximum tree depth.
    #[arg(long, default_value_t = 20)]
    pub max_depth: usize,

    /// Minimum samples required to split a node.
    #[arg(long, default_value_t = 5)]
    pub min_samples_split: usize,

    /// Minimum samples required in a leaf.
    #[arg(long, default_value_t = 2)]
    pub min_samples_leaf: usize,

    /// Directory receiving the artifact bundle.
    #[arg(long, default_value = "model")]
    pub model_dir: PathBuf,
}

/// Options for the HTTP server.
#[derive(Debug, Parser)]
pub struct ServeArgs {
    /// Directory holding the artifact bundle.
    #[arg(long, default_value = "model")]
    pub model_dir: PathBuf,

    /// Listen address.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port (defaults to $PORT, else 5000).
    #[arg(long)]
    pub port: Option<u16>,
}

/// Options for a one-shot prediction. Omitted fields take the documented
/// serving defaults.
#[derive(Debug, Parser)]
pub struct PredictArgs {
    /// Directory holding the artifact bundle.
    #[arg(long, default_value = "model")]
    pub model_dir: PathBuf,

    /// Overall quality score, 1-10.
    #[arg(long)]
    pub overall_qual: Option<f64>,

    /// Above-ground living area, square feet.
    #[arg(long)]
    pub gr_liv_area: Option<f64>,

    /// Basement area, square feet.
    #[arg(long)]
    pub total_bsmt_sf: Option<f64>,

    /// Garage capacity, cars.
    #[arg(long)]
    pub garage_cars: Option<f64>,

    /// Year of construction.
    #[arg(long)]
    pub year_built: Option<f64>,

    /// Neighborhood name.
    #[arg(long)]
    pub neighborhood: Option<String>,
}

/// Options for the TUI.
#[derive(Debug, Parser)]
pub struct TuiArgs {
    /// Directory holding the artifact bundle.
    #[arg(long, default_value = "model")]
    pub model_dir: PathBuf,
}
