use crate::error::{ArtifactError, InferenceError};
use crate::normalize::FeatureRecord;
use crate::schema::FeatureSchema;
use std::sync::Arc;

/// A fitted feature transform. Output has the same length and order as the input.
pub trait Scaler: Send + Sync {
    fn input_width(&self) -> usize;
    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// A trained regressor returning one value: predicted delay in minutes.
pub trait Model: Send + Sync {
    fn input_width(&self) -> usize;
    fn predict(&self, x: &[f64]) -> Result<f64, InferenceError>;
}

/// Scaler + model pair, checked against the schema once at construction.
#[derive(Clone)]
pub struct InferenceEngine {
    scaler: Arc<dyn Scaler>,
    model: Arc<dyn Model>,
    width: usize,
}

impl InferenceEngine {
    pub fn new(
        schema: &FeatureSchema,
        scaler: Arc<dyn Scaler>,
        model: Arc<dyn Model>,
    ) -> Result<Self, ArtifactError> {
        let width = schema.len();
        if scaler.input_width() != width {
            return Err(ArtifactError::SchemaMismatch {
                artifact: "scaler",
                expected: width,
                got: scaler.input_width(),
            });
        }
        if model.input_width() != width {
            return Err(ArtifactError::SchemaMismatch {
                artifact: "model",
                expected: width,
                got: model.input_width(),
            });
        }
        Ok(Self {
            scaler,
            model,
            width,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn predict(&self, record: &FeatureRecord) -> Result<f64, InferenceError> {
        if record.len() != self.width {
            return Err(InferenceError::SchemaMismatch {
                expected: self.width,
                got: record.len(),
            });
        }

        let scaled = self.scaler.transform(record.as_slice())?;
        if scaled.len() != self.width {
            return Err(InferenceError::SchemaMismatch {
                expected: self.width,
                got: scaled.len(),
            });
        }

        let y = self.model.predict(&scaled)?;
        if !y.is_finite() {
            return Err(InferenceError::NonFinite(y));
        }
        Ok(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Identity(usize);

    impl Scaler for Identity {
        fn input_width(&self) -> usize {
            self.0
        }
        fn transform(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
            Ok(x.to_vec())
        }
    }

    /// Sums its input and remembers what it was given.
    struct Recorder {
        width: usize,
        seen: Mutex<Vec<f64>>,
    }

    impl Model for Recorder {
        fn input_width(&self) -> usize {
            self.width
        }
        fn predict(&self, x: &[f64]) -> Result<f64, InferenceError> {
            *self.seen.lock().unwrap() = x.to_vec();
            Ok(x.iter().sum())
        }
    }

    struct Constant(f64, usize);

    impl Model for Constant {
        fn input_width(&self) -> usize {
            self.1
        }
        fn predict(&self, _x: &[f64]) -> Result<f64, InferenceError> {
            Ok(self.0)
        }
    }

    #[test]
    fn rejects_artifacts_of_the_wrong_width() {
        let schema = FeatureSchema::african_routes();
        let err = InferenceEngine::new(&schema, Arc::new(Identity(29)), Arc::new(Constant(0.0, 30)))
            .err()
            .unwrap();
        assert!(matches!(err, ArtifactError::SchemaMismatch { artifact: "scaler", expected: 30, got: 29 }));

        let err = InferenceEngine::new(&schema, Arc::new(Identity(30)), Arc::new(Constant(0.0, 31)))
            .err()
            .unwrap();
        assert!(matches!(err, ArtifactError::SchemaMismatch { artifact: "model", .. }));
    }

    #[test]
    fn rejects_record_of_the_wrong_length() {
        let schema = FeatureSchema::african_routes();
        let engine =
            InferenceEngine::new(&schema, Arc::new(Identity(30)), Arc::new(Constant(1.0, 30))).unwrap();
        let err = engine.predict(&FeatureRecord::zeros(12)).unwrap_err();
        assert_eq!(err, InferenceError::SchemaMismatch { expected: 30, got: 12 });
    }

    #[test]
    fn passes_scaled_vector_through_in_order() {
        let schema = FeatureSchema::african_routes();
        let model = Arc::new(Recorder {
            width: 30,
            seen: Mutex::new(Vec::new()),
        });
        let engine = InferenceEngine::new(&schema, Arc::new(Identity(30)), model.clone()).unwrap();

        let mut values = vec![0.0; 30];
        values[0] = 14.0;
        values[2] = 15.0;
        values[29] = 1.0;
        let y = engine.predict(&FeatureRecord::from_values(values.clone())).unwrap();

        assert_eq!(y, 30.0);
        assert_eq!(*model.seen.lock().unwrap(), values);
    }

    #[test]
    fn non_finite_output_is_an_error() {
        let schema = FeatureSchema::african_routes();
        let engine =
            InferenceEngine::new(&schema, Arc::new(Identity(30)), Arc::new(Constant(f64::NAN, 30))).unwrap();
        assert!(matches!(
            engine.predict(&FeatureRecord::zeros(30)),
            Err(InferenceError::NonFinite(_))
        ));
    }
}
