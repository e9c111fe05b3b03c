//! OpenAPI 3 description of the service, built from the live schema so the
//! documented field bounds are the ones the normalizer enforces.

use crate::normalize::DelayBounds;
use crate::schema::{FeatureSchema, SlotKind};
use serde_json::{json, Map, Value};

fn flight_input(schema: &FeatureSchema, delay: DelayBounds) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for slot in schema.slots() {
        let aliases: Vec<&str> = slot
            .request_names()
            .filter(|n| *n != slot.friendly)
            .collect();
        let mut prop = match &slot.kind {
            SlotKind::Hour => json!({ "type": "integer", "minimum": 0, "maximum": 23 }),
            SlotKind::DelayMinutes => json!({
                "type": "number",
                "minimum": delay.min,
                "maximum": delay.max,
                "description": "positive = late, negative = early, 0 = on time",
            }),
            SlotKind::Flag { group, label } => json!({
                "type": "integer",
                "enum": [0, 1],
                "default": 0,
                "description": format!("{group:?} {label}"),
            }),
        };
        if !matches!(slot.kind, SlotKind::Flag { .. }) {
            required.push(slot.friendly.clone());
        }
        if !aliases.is_empty() {
            prop["x-aliases"] = json!(aliases);
        }
        properties.insert(slot.friendly.clone(), prop);
    }

    json!({
        "type": "object",
        "required": required,
        "properties": properties,
        "additionalProperties": true,
    })
}

fn json_body(schema_ref: &str) -> Value {
    json!({ "application/json": { "schema": { "$ref": schema_ref } } })
}

fn predict_path() -> Value {
    let error = json_body("#/components/schemas/Error");
    json!({
        "post": {
            "summary": "Predict departure delay in minutes",
            "requestBody": {
                "required": true,
                "content": json_body("#/components/schemas/FlightInput"),
            },
            "responses": {
                "200": { "description": "Prediction", "content": json_body("#/components/schemas/PredictionResult") },
                "400": { "description": "Malformed JSON", "content": error },
                "422": { "description": "Field out of range, missing or mistyped", "content": error },
                "500": { "description": "Inference failure", "content": error },
            },
        }
    })
}

fn simple_get(summary: &str, returns: &str) -> Value {
    json!({ "get": { "summary": summary, "responses": { "200": { "description": returns } } } })
}

pub fn document(schema: &FeatureSchema, delay: DelayBounds) -> Value {
    let prediction = json!({
        "type": "object",
        "required": ["predicted_delay_minutes", "interpretation"],
        "properties": {
            "predicted_delay_minutes": { "type": "number" },
            "interpretation": { "type": "string" },
        },
    });
    let error = json!({
        "type": "object",
        "required": ["error"],
        "properties": { "error": { "type": "string" } },
    });

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "African Flight Delay Prediction API",
            "description": "Predict flight delays for African airlines based on departure information",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": {
            "/predict": predict_path(),
            "/airlines": simple_get("Supported airlines", "supported_airlines"),
            "/airports": simple_get("Supported airports", "supported_origins, supported_destinations"),
            "/health": simple_get("Liveness", "healthy"),
        },
        "components": {
            "schemas": {
                "FlightInput": flight_input(schema, delay),
                "PredictionResult": prediction,
                "Error": error,
            }
        },
    })
}
