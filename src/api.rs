use crate::catalog::{list_airlines, list_airports, Airlines, Airports};
use crate::error::ApiError;
use crate::normalize::{FeatureRecord, FlightDescription};
use crate::openapi;
use crate::predictor::{PredictionResult, Predictor};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub log_pred: bool,
}

impl AppState {
    pub fn new(predictor: Predictor, log_pred: bool) -> Self {
        Self {
            predictor: Arc::new(predictor),
            log_pred,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/docs", get(docs))
        .route("/predict", post(predict))
        .route("/airlines", get(airlines))
        .route("/airports", get(airports))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------- Handlers ----------

async fn root() -> Json<Value> {
    Json(json!({
        "message": "African Flight Delay Prediction API",
        "description": "Use /predict endpoint to predict flight delays",
        "documentation": "/docs",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn docs(State(state): State<AppState>) -> Json<Value> {
    Json(openapi::document(
        state.predictor.schema(),
        state.predictor.delay_bounds(),
    ))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<FlightDescription>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let Json(raw) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let record = state.predictor.normalize(&raw).map_err(|e| {
        tracing::info!(error = %e, "rejected prediction request");
        ApiError::from(e)
    })?;

    if state.log_pred {
        log_record(&state.predictor, &record);
    }

    let out = state.predictor.predict_record(&record)?;
    tracing::debug!(
        delay = out.predicted_delay_minutes,
        interpretation = %out.interpretation,
        "prediction"
    );
    Ok(Json(out))
}

async fn airlines(State(state): State<AppState>) -> Json<Airlines> {
    Json(list_airlines(state.predictor.schema()))
}

async fn airports(State(state): State<AppState>) -> Json<Airports> {
    Json(list_airports(state.predictor.schema()))
}

// Debug signal so we can confirm the vector isn't all zeros.
fn log_record(predictor: &Predictor, record: &FeatureRecord) {
    let vec = record.as_slice();
    let nz = vec.iter().filter(|x| **x != 0.0).count();
    let mean = if vec.is_empty() {
        0.0
    } else {
        vec.iter().sum::<f64>() / (vec.len() as f64)
    };
    let std = if vec.len() < 2 {
        0.0
    } else {
        (vec.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (vec.len() as f64)).sqrt()
    };
    let sample: Vec<String> = predictor
        .schema()
        .columns()
        .zip(vec)
        .take(6)
        .map(|(name, v)| format!("{}={:.3}", name, v))
        .collect();
    tracing::info!(
        "recv in_dim={} nonzero={} mean={:.3} std={:.3} sample=[{}]",
        vec.len(),
        nz,
        mean,
        std,
        sample.join(", ")
    );
}
