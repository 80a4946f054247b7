//! The axum JSON API.
//!
//! Routes mirror the request/response contract of the original service:
//!
//! - `GET  /`         — embedded demo page exercising the API
//! - `POST /predict`  — `{success, prediction, formatted_prediction}` or
//!                      `{success: false, error}`
//! - `GET  /api/info` — algorithm, feature names, known neighborhoods,
//!                      encoded column count
//! - `GET  /health`   — liveness
//!
//! The server starts even when the artifact bundle is missing; `/predict`
//! then answers with a model-not-loaded error instead of crashing, so a
//! deploy can come up before its first training run.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::AppError;
use crate::serve::context::{PredictError, ServingContext};

#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub model_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

struct AppState {
    /// `None` when the artifact bundle was absent at startup.
    context: Option<ServingContext>,
}

#[derive(Serialize)]
struct PredictResponse {
    success: bool,
    prediction: f64,
    formatted_prediction: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Load the bundle, build the router, and serve until interrupted.
///
/// Synchronous entry point: the tokio runtime is an implementation detail of
/// this module, so `main` stays a plain `fn`.
pub fn run(config: &ServeConfig) -> Result<(), AppError> {
    // RUST_LOG overrides; default to info-level request/serve events.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let context = match ServingContext::load(&config.model_dir) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            warn!("serving without a model: {e}");
            None
        }
    };
    let state = Arc::new(AppState { context });

    let router = Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/api/info", get(info_endpoint))
        .route("/health", get(health))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::input(format!("Invalid listen address: {e}")))?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| AppError::internal(format!("Failed to start async runtime: {e}")))?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
        info!("listening on http://{addr}");
        axum::serve(listener, router)
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))
    })
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "message": "House price prediction API is running",
    }))
}

async fn info_endpoint(State(state): State<Arc<AppState>>) -> Response {
    match &state.context {
        Some(ctx) => Json(ctx.info()).into_response(),
        None => error_response(PredictError::ModelNotLoaded),
    }
}

async fn predict(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> Response {
    let Some(ctx) = &state.context else {
        warn!("predict request while model not loaded");
        return error_response(PredictError::ModelNotLoaded);
    };

    match ctx.predict_json(&body) {
        Ok(prediction) => {
            info!(price = prediction.price, "prediction served");
            Json(PredictResponse {
                success: true,
                prediction: prediction.price,
                formatted_prediction: prediction.formatted,
            })
            .into_response()
        }
        Err(e) => {
            warn!("prediction failed: {e}");
            error_response(e)
        }
    }
}

fn error_response(error: PredictError) -> Response {
    let status = match error {
        // The model being absent is a server-side condition; everything else
        // is the client's input.
        PredictError::ModelNotLoaded | PredictError::SchemaMismatch { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        PredictError::MalformedInput(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(ErrorResponse::new(error.to_string()))).into_response()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>House Price Prediction</title>
  <style>
    body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
    label { display: block; margin-top: 0.75rem; }
    input, select { width: 100%; padding: 0.3rem; }
    button { margin-top: 1rem; padding: 0.5rem 1.5rem; }
    #result { margin-top: 1rem; font-size: 1.3rem; }
  </style>
</head>
<body>
  <h1>House Price Prediction</h1>
  <label>Overall Quality (1-10) <input id="OverallQual" type="number" value="5"></label>
  <label>Living Area (sq ft) <input id="GrLivArea" type="number" value="1500"></label>
  <label>Basement Area (sq ft) <input id="TotalBsmtSF" type="number" value="1000"></label>
  <label>Garage Cars <input id="GarageCars" type="number" value="2"></label>
  <label>Year Built <input id="YearBuilt" type="number" value="2000"></label>
  <label>Neighborhood <select id="Neighborhood"></select></label>
  <button onclick="predict()">Predict Price</button>
  <div id="result"></div>
  <script>
    const fields = ["OverallQual","GrLivArea","TotalBsmtSF","GarageCars","YearBuilt","Neighborhood"];
    fetch("/api/info").then(r => r.json()).then(info => {
      const select = document.getElementById("Neighborhood");
      (info.neighborhoods || ["Ames"]).forEach(n => {
        const opt = document.createElement("option");
        opt.value = n; opt.textContent = n;
        select.appendChild(opt);
      });
    });
    function predict() {
      const body = {};
      fields.forEach(f => body[f] = document.getElementById(f).value);
      fetch("/predict", {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify(body),
      }).then(r => r.json()).then(data => {
        document.getElementById("result").textContent =
          data.success ? "Estimated price: " + data.formatted_prediction
                       : "Error: " + data.error;
      });
    }
  </script>
</body>
</html>
"#;
