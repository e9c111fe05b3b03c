use anyhow::Context;
use flight_delay_predictor::{
    api, artifacts, config::Config, FeatureSchema, InferenceEngine, Predictor, RequestNormalizer,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::from_env()?;
    let schema = Arc::new(FeatureSchema::african_routes());

    // Artifacts load once here; any failure stops the process before it binds.
    let scaler = artifacts::StandardScaler::load(&cfg.scaler_path, &schema)
        .with_context(|| format!("loading scaler from {}", cfg.scaler_path.display()))?;
    let model = artifacts::load_model(&cfg.model_path, &schema)
        .with_context(|| format!("loading model from {}", cfg.model_path.display()))?;
    let engine = InferenceEngine::new(&schema, Arc::new(scaler), Arc::from(model))
        .context("artifacts do not match the feature schema")?;

    let cols: Vec<&str> = schema.columns().collect();
    tracing::info!("loaded model; feat_list[{}]: {:?}", cols.len(), cols);

    let predictor = Predictor::new(RequestNormalizer::new(schema.clone(), cfg.delay), engine);

    // Warmup so a broken artifact fails now rather than on the first request
    let y = predictor.warmup().context("warmup forward failed")?;
    tracing::info!(baseline = y, "warmup forward ok");

    let app = api::router(api::AppState::new(predictor, cfg.log_pred));

    let addr = cfg.bind_addr();
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
