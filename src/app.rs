//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the training pipeline and prints its report
//! - starts the HTTP server or the TUI
//! - handles one-shot predictions

use clap::Parser;

use crate::cli::{Command, PredictArgs, ServeArgs, TrainArgs};
use crate::domain::{ForestParams, RawRecord, TrainConfig};
use crate::error::AppError;
use crate::serve::{ServeConfig, ServingContext};

pub mod pipeline;

/// Entry point for the `hp` binary.
pub fn run() -> Result<(), AppError> {
    // Allow a local .env to supply PORT and similar settings.
    dotenvy::dotenv().ok();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Train(args) => handle_train(args),
        Command::Serve(args) => handle_serve(args),
        Command::Predict(args) => handle_predict(args),
        Command::Tui(args) => crate::tui::run(&args.model_dir),
    }
}

fn handle_train(args: TrainArgs) -> Result<(), AppError> {
    let config = train_config_from_args(&args);
    let output = pipeline::run_train(&config)?;
    println!("{}", crate::report::format_train_summary(&output, &config));
    Ok(())
}

fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    let port = match args.port {
        Some(p) => p,
        None => match std::env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::input(format!("Invalid PORT value: '{raw}'")))?,
            Err(_) => 5000,
        },
    };

    crate::serve::run_server(&ServeConfig {
        model_dir: args.model_dir,
        host: args.host,
        port,
    })
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let context = ServingContext::load(&args.model_dir)?;

    let defaults = RawRecord::default();
    let record = RawRecord {
        overall_qual: args.overall_qual.unwrap_or(defaults.overall_qual),
        gr_liv_area: args.gr_liv_area.unwrap_or(defaults.gr_liv_area),
        total_bsmt_sf: args.total_bsmt_sf.unwrap_or(defaults.total_bsmt_sf),
        garage_cars: args.garage_cars.unwrap_or(defaults.garage_cars),
        year_built: args.year_built.unwrap_or(defaults.year_built),
        neighborhood: args.neighborhood.unwrap_or(defaults.neighborhood),
    };

    let prediction = context
        .predict_record(&record)
        .map_err(|e| AppError::input(e.to_string()))?;

    // Same shape as the HTTP response, for scripting.
    println!(
        "{}",
        serde_json::json!({
            "success": true,
            "prediction": prediction.price,
            "formatted_prediction": prediction.formatted,
        })
    );
    Ok(())
}

pub fn train_config_from_args(args: &TrainArgs) -> TrainConfig {
    TrainConfig {
        csv_path: args.csv.clone(),
        offline: args.offline,
        seed: args.seed,
        test_ratio: args.test_size,
        synthetic_rows: args.synthetic_rows,
        model: args.model,
        forest: ForestParams {
            n_trees: args.trees,
            max_depth: args.max_depth,
            min_samples_split: args.min_samples_split,
            min_samples_leaf: args.min_samples_leaf,
        },
        model_dir: args.model_dir.clone(),
    }
}
