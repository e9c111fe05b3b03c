//! Concrete scaler and model implementations, and the loaders that read them from disk.

use crate::engine::{Model, Scaler};
use crate::error::{ArtifactError, InferenceError};
use crate::schema::FeatureSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::{fs, path::Path};
use tch::{kind::Kind, CModule, Device, Tensor};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let txt = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ---------- Scaler ----------

#[derive(Deserialize)]
struct ScalerJson {
    mean: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

/// Standardisation `(x - mean) / scale`, as exported from a fitted StandardScaler.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        if mean.len() != scale.len() {
            return Err(ArtifactError::Invalid(format!(
                "scaler mean has {} entries but scale has {}",
                mean.len(),
                scale.len()
            )));
        }
        // Zero-variance columns were left unscaled at fit time.
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();
        Ok(Self { mean, scale })
    }

    /// Loads the scaler and, when it recorded its column names, checks them
    /// against the schema order.
    pub fn load(path: &Path, schema: &FeatureSchema) -> Result<Self, ArtifactError> {
        let raw: ScalerJson = read_json(path)?;
        if let Some(names) = &raw.feature_names {
            if !names.iter().map(String::as_str).eq(schema.columns()) {
                let first_diff = names
                    .iter()
                    .map(String::as_str)
                    .zip(schema.columns())
                    .position(|(a, b)| a != b)
                    .unwrap_or(names.len().min(schema.len()));
                tracing::error!(
                    index = first_diff,
                    scaler = ?names.get(first_diff),
                    schema = ?schema.columns().nth(first_diff),
                    "scaler column order differs from feature schema"
                );
                return Err(ArtifactError::SchemaMismatch {
                    artifact: "scaler feature_names",
                    expected: schema.len(),
                    got: names.len(),
                });
            }
        }
        Self::new(raw.mean, raw.scale)
    }
}

impl Scaler for StandardScaler {
    fn input_width(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if x.len() != self.mean.len() {
            return Err(InferenceError::SchemaMismatch {
                expected: self.mean.len(),
                got: x.len(),
            });
        }
        Ok(x
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect())
    }
}

// ---------- Models ----------

/// `y = w . x + b`, as exported from a fitted linear regressor.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearRegressor {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        read_json(path)
    }
}

impl Model for LinearRegressor {
    fn input_width(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, x: &[f64]) -> Result<f64, InferenceError> {
        if x.len() != self.coefficients.len() {
            return Err(InferenceError::SchemaMismatch {
                expected: self.coefficients.len(),
                got: x.len(),
            });
        }
        let dot: f64 = x.iter().zip(&self.coefficients).map(|(a, b)| a * b).sum();
        Ok(dot + self.intercept)
    }
}

/// TorchScript regressor on CPU. Input `[1, in_dim]`, output a single element.
pub struct TorchRegressor {
    model: CModule,
    device: Device,
    in_dim: usize,
}

impl TorchRegressor {
    pub fn load(path: &Path, in_dim: usize) -> Result<Self, ArtifactError> {
        let device = Device::Cpu;
        let model = CModule::load_on_device(path, device)?;

        // Probe with a dummy forward so a width mismatch shows up now, not on the first request.
        let dummy = Tensor::zeros([1, in_dim as i64], (Kind::Float, device));
        let out = match model.forward_ts(&[dummy]) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(error = %e, in_dim, "probe forward failed; model rejects the schema width");
                return Err(ArtifactError::Torch(e));
            }
        };
        if out.numel() != 1 {
            return Err(ArtifactError::Invalid(format!(
                "expected a single output value, model returned shape {:?}",
                out.size()
            )));
        }

        Ok(Self {
            model,
            device,
            in_dim,
        })
    }
}

impl Model for TorchRegressor {
    fn input_width(&self) -> usize {
        self.in_dim
    }

    fn predict(&self, x: &[f64]) -> Result<f64, InferenceError> {
        if x.len() != self.in_dim {
            return Err(InferenceError::SchemaMismatch {
                expected: self.in_dim,
                got: x.len(),
            });
        }
        let xs: Vec<f32> = x.iter().map(|v| *v as f32).collect();
        let input = Tensor::from_slice(&xs)
            .reshape([1, self.in_dim as i64])
            .to_device(self.device);

        let out = self
            .model
            .forward_ts(&[input])
            .map_err(|e| InferenceError::Model(e.to_string()))?;
        Ok(out.reshape([-1]).double_value(&[0]))
    }
}

/// Picks the model implementation from the file extension: `.json` linear, `.pt`/`.ts` TorchScript.
pub fn load_model(path: &Path, schema: &FeatureSchema) -> Result<Box<dyn Model>, ArtifactError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Box::new(LinearRegressor::load(path)?)),
        Some("pt") | Some("ts") => Ok(Box::new(TorchRegressor::load(path, schema.len())?)),
        other => Err(ArtifactError::Invalid(format!(
            "unsupported model format {:?} for {}",
            other.unwrap_or(""),
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn standard_scaler_transform() {
        let s = StandardScaler::new(vec![10.0, 0.0, 5.0], vec![2.0, 0.0, 0.5]).unwrap();
        assert_eq!(s.transform(&[14.0, 3.0, 5.0]).unwrap(), vec![2.0, 3.0, 0.0]);
        assert!(matches!(
            s.transform(&[1.0]),
            Err(InferenceError::SchemaMismatch { expected: 3, got: 1 })
        ));
    }

    #[test]
    fn scaler_length_mismatch_is_invalid() {
        assert!(matches!(
            StandardScaler::new(vec![0.0; 3], vec![1.0; 2]),
            Err(ArtifactError::Invalid(_))
        ));
    }

    #[test]
    fn scaler_feature_names_must_follow_schema_order() {
        let schema = FeatureSchema::african_routes();
        let mut names: Vec<String> = schema.columns().map(str::to_string).collect();
        let body = serde_json::json!({
            "mean": vec![0.0; 30],
            "scale": vec![1.0; 30],
            "feature_names": names,
        });
        let f = write_tmp(".json", &body.to_string());
        assert_eq!(StandardScaler::load(f.path(), &schema).unwrap().input_width(), 30);

        names.swap(0, 1);
        let body = serde_json::json!({
            "mean": vec![0.0; 30],
            "scale": vec![1.0; 30],
            "feature_names": names,
        });
        let f = write_tmp(".json", &body.to_string());
        assert!(matches!(
            StandardScaler::load(f.path(), &schema),
            Err(ArtifactError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn missing_or_garbled_files_fail() {
        let schema = FeatureSchema::african_routes();
        assert!(matches!(
            StandardScaler::load(Path::new("/nonexistent/scaler.json"), &schema),
            Err(ArtifactError::Io { .. })
        ));
        let f = write_tmp(".json", "{ not json");
        assert!(matches!(
            load_model(f.path(), &schema),
            Err(ArtifactError::Parse { .. })
        ));
        let f = write_tmp(".pkl", "");
        assert!(matches!(load_model(f.path(), &schema), Err(ArtifactError::Invalid(_))));
    }

    #[test]
    fn linear_model_from_json() {
        let schema = FeatureSchema::african_routes();
        let f = write_tmp(".json", r#"{"coefficients": [1.0, 2.0], "intercept": 0.5}"#);
        let model = load_model(f.path(), &schema).unwrap();
        assert_eq!(model.input_width(), 2);
        assert_eq!(model.predict(&[3.0, 4.0]).unwrap(), 11.5);
    }
}
