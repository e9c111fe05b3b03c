use crate::engine::InferenceEngine;
use crate::error::PredictError;
use crate::interpret::classify;
use crate::normalize::{DelayBounds, FeatureRecord, FlightDescription, RequestNormalizer};
use crate::schema::FeatureSchema;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub predicted_delay_minutes: f64,
    pub interpretation: String,
}

/// normalize -> scale + predict -> classify. Shared read-only across requests.
pub struct Predictor {
    normalizer: RequestNormalizer,
    engine: InferenceEngine,
}

impl Predictor {
    pub fn new(normalizer: RequestNormalizer, engine: InferenceEngine) -> Self {
        Self { normalizer, engine }
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.normalizer.schema()
    }

    pub fn delay_bounds(&self) -> DelayBounds {
        self.normalizer.delay_bounds()
    }

    pub fn normalize(&self, raw: &FlightDescription) -> Result<FeatureRecord, PredictError> {
        Ok(self.normalizer.normalize(raw)?)
    }

    pub fn predict_record(&self, record: &FeatureRecord) -> Result<PredictionResult, PredictError> {
        let delay = self.engine.predict(record)?;
        Ok(PredictionResult {
            predicted_delay_minutes: round2(delay),
            // classified on the unrounded value
            interpretation: classify(delay).to_string(),
        })
    }

    pub fn predict(&self, raw: &FlightDescription) -> Result<PredictionResult, PredictError> {
        let record = self.normalize(raw)?;
        self.predict_record(&record)
    }

    /// One forward pass over an all-zero record.
    pub fn warmup(&self) -> Result<f64, PredictError> {
        Ok(self.engine.predict(&FeatureRecord::zeros(self.engine.width()))?)
    }
}

// Halves go to the even hundredth, the same as the minute labels.
fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}
