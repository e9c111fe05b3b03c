use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Problems with the feature catalogue itself. Only raised while building a schema.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("feature schema has no slots")]
    Empty,
    #[error("request name `{0}` is claimed by more than one slot")]
    DuplicateName(String),
}

/// A bad request. Reported back to the caller, never reaches the model.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    Range {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} is required")]
    Missing { field: String },
    #[error("{field} must be {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Range { field, .. }
            | ValidationError::Missing { field }
            | ValidationError::InvalidType { field, .. } => field,
        }
    }
}

/// Failures inside scale + predict. Any of these means the deployment is broken.
#[derive(Debug, Error, PartialEq)]
pub enum InferenceError {
    #[error("feature length mismatch: got {got}, expected {expected}")]
    SchemaMismatch { expected: usize, got: usize },
    #[error("model returned a non-finite value ({0})")]
    NonFinite(f64),
    #[error("model failure: {0}")]
    Model(String),
}

/// Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse artifact at {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("torch error: {0}")]
    Torch(#[from] tch::TchError),
    #[error("invalid artifact: {0}")]
    Invalid(String),
    #[error("{artifact} expects {got} input features but the schema has {expected}")]
    SchemaMismatch {
        artifact: &'static str,
        expected: usize,
        got: usize,
    },
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Internal(String),
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Validation(e) => ApiError::Validation(e),
            PredictError::Inference(e) => {
                tracing::error!(error = %e, "inference failed");
                ApiError::Internal(e.to_string())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            code,
            Json(ErrBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_message_names_field_and_bound() {
        let err = ValidationError::Range {
            field: "scheduled_hour".into(),
            value: 24.0,
            min: 0.0,
            max: 23.0,
        };
        assert_eq!(err.to_string(), "scheduled_hour must be between 0 and 23 (got 24)");
        assert_eq!(err.field(), "scheduled_hour");
    }

    #[test]
    fn status_codes() {
        let bad = ApiError::BadRequest("nope".into()).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let invalid = ApiError::from(ValidationError::Missing {
            field: "actual_hour".into(),
        })
        .into_response();
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let broken = ApiError::from(PredictError::Inference(InferenceError::SchemaMismatch {
            expected: 30,
            got: 29,
        }))
        .into_response();
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
