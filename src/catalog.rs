//! Discovery lists derived from the feature schema.

use crate::schema::{FeatureSchema, FlagGroup};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airlines {
    pub supported_airlines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airports {
    #[serde(rename = "supported_origins")]
    pub origins: Vec<String>,
    #[serde(rename = "supported_destinations")]
    pub destinations: Vec<String>,
}

fn labels(schema: &FeatureSchema, group: FlagGroup) -> Vec<String> {
    schema.group_labels(group).map(str::to_string).collect()
}

pub fn list_airlines(schema: &FeatureSchema) -> Airlines {
    Airlines {
        supported_airlines: labels(schema, FlagGroup::Airline),
    }
}

pub fn list_airports(schema: &FeatureSchema) -> Airports {
    Airports {
        origins: labels(schema, FlagGroup::Origin),
        destinations: labels(schema, FlagGroup::Destination),
    }
}
