//! Flat request object -> schema-ordered feature vector.

use crate::error::ValidationError;
use crate::schema::{FeatureSchema, SlotKind};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

const HOUR_MIN: f64 = 0.0;
const HOUR_MAX: f64 = 23.0;

/// Inbound flight description: every field is a top-level key, under either
/// its friendly name or its model column name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FlightDescription {
    fields: Map<String, Value>,
}

impl FlightDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl From<Map<String, Value>> for FlightDescription {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// One value per schema slot, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    values: Vec<f64>,
}

impl FeatureRecord {
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// All-zero record, used for the startup warmup pass.
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Accepted departure delay range in minutes, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for DelayBounds {
    fn default() -> Self {
        Self {
            min: -30.0,
            max: 90.0,
        }
    }
}

pub struct RequestNormalizer {
    schema: Arc<FeatureSchema>,
    delay: DelayBounds,
    known: HashSet<String>,
}

impl RequestNormalizer {
    pub fn new(schema: Arc<FeatureSchema>, delay: DelayBounds) -> Self {
        let known = schema
            .slots()
            .iter()
            .flat_map(|slot| slot.request_names())
            .map(str::to_string)
            .collect();
        Self {
            schema,
            delay,
            known,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn delay_bounds(&self) -> DelayBounds {
        self.delay
    }

    /// Validates, defaults and reorders. The first violation in schema order is returned.
    pub fn normalize(&self, raw: &FlightDescription) -> Result<FeatureRecord, ValidationError> {
        let mut values = Vec::with_capacity(self.schema.len());

        for slot in self.schema.slots() {
            let found = slot
                .request_names()
                .find_map(|name| raw.get(name).map(|v| (name, v)));

            let value = match (&slot.kind, found) {
                (SlotKind::Flag { .. }, None) => 0.0,
                (_, None) => {
                    return Err(ValidationError::Missing {
                        field: slot.display_name().to_string(),
                    })
                }
                (SlotKind::Hour, Some((name, v))) => {
                    let hour = integral(name, v)?;
                    within(name, hour, HOUR_MIN, HOUR_MAX)?
                }
                (SlotKind::DelayMinutes, Some((name, v))) => {
                    let minutes = number(name, v, "a number")?;
                    within(name, minutes, self.delay.min, self.delay.max)?
                }
                (SlotKind::Flag { .. }, Some((name, v))) => flag(name, v)?,
            };
            values.push(value);
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            let ignored: Vec<&str> = raw.keys().filter(|k| !self.known.contains(*k)).collect();
            if !ignored.is_empty() {
                tracing::debug!(?ignored, "dropping unrecognized request fields");
            }
        }

        Ok(FeatureRecord { values })
    }
}

fn number(name: &str, v: &Value, expected: &'static str) -> Result<f64, ValidationError> {
    v.as_f64().ok_or_else(|| ValidationError::InvalidType {
        field: name.to_string(),
        expected,
    })
}

// 14 and 14.0 are both accepted; 14.5 is not.
fn integral(name: &str, v: &Value) -> Result<f64, ValidationError> {
    let x = number(name, v, "an integer")?;
    if x.fract() != 0.0 {
        return Err(ValidationError::InvalidType {
            field: name.to_string(),
            expected: "an integer",
        });
    }
    Ok(x)
}

// Numbers other than exactly 0 or 1 are out of range, including 0.5.
fn flag(name: &str, v: &Value) -> Result<f64, ValidationError> {
    let x = number(name, v, "0 or 1")?;
    if x != 0.0 && x != 1.0 {
        return Err(ValidationError::Range {
            field: name.to_string(),
            value: x,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(x)
}

fn within(name: &str, value: f64, min: f64, max: f64) -> Result<f64, ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::Range {
            field: name.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(value)
}
