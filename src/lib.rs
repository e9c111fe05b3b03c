pub mod api;
pub mod artifacts;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod interpret;
pub mod normalize;
pub mod openapi;
pub mod predictor;
pub mod schema;

pub use engine::{InferenceEngine, Model, Scaler};
pub use error::{ApiError, ArtifactError, InferenceError, PredictError, SchemaError, ValidationError};
pub use interpret::{classify, Category, Interpretation};
pub use normalize::{DelayBounds, FeatureRecord, FlightDescription, RequestNormalizer};
pub use predictor::{PredictionResult, Predictor};
pub use schema::{FeatureSchema, FeatureSlot, FlagGroup, SlotKind};
