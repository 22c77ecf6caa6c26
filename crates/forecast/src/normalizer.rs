//! Parsing and validation of forecasting process output.
//!
//! Two separable stages:
//! 1. [`repair_quotes`] rewrites the single-quoted pseudo-JSON the process may
//!    print into strict JSON text.
//! 2. [`parse_structured`] parses that text into an object, then
//!    [`normalize`] checks the required fields and their types.

use log::debug;
use serde_json::{Map, Value};

use crate::errors::NormalizeError;
use crate::models::{PredictionResult, RawProcessOutput, Signal};

/// Fields every forecast must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "currentPrice",
    "predictedPrice",
    "signal",
    "confidence",
    "history",
];

/// Fields added by enrichment. Never taken from process output.
const RESERVED_FIELDS: [&str; 3] = ["currency", "timestamp", "stock"];

/// Treats single quotes as string delimiters by rewriting them to double quotes.
pub fn repair_quotes(raw: &str) -> String {
    raw.trim().replace('\'', "\"")
}

/// Strictly parses repaired text into a JSON object.
pub fn parse_structured(text: &str) -> Result<Map<String, Value>, NormalizeError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| NormalizeError::parse(e.to_string(), text))?;
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(NormalizeError::parse(
            format!("expected an object, found {}", json_type(&other)),
            text,
        )),
    }
}

/// Turns raw process output into a validated [`PredictionResult`].
pub fn normalize(raw: &RawProcessOutput) -> Result<PredictionResult, NormalizeError> {
    let repaired = repair_quotes(raw.as_str());
    let mut fields = parse_structured(&repaired).map_err(|e| e.with_raw(raw.as_str()))?;

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !fields.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(NormalizeError::MissingFields(missing));
    }

    // Required fields are re-emitted in canonical form: prices and confidence
    // as floats, the signal under the label the dashboard renders ('Buy' ->
    // "BUY"). Everything else passes through untouched.
    let current_price = number_field(&fields, "currentPrice")?;
    let predicted_price = number_field(&fields, "predictedPrice")?;
    let history = history_field(&fields)?;
    let signal = signal_field(&fields)?;
    let confidence = confidence_field(&fields)?;

    for field in REQUIRED_FIELDS {
        fields.remove(field);
    }
    for field in RESERVED_FIELDS {
        if fields.remove(field).is_some() {
            debug!("Dropped reserved field '{}' from forecast output", field);
        }
    }

    Ok(PredictionResult {
        current_price,
        predicted_price,
        signal,
        confidence,
        history,
        extra: fields,
    })
}

fn number_field(fields: &Map<String, Value>, field: &'static str) -> Result<f64, NormalizeError> {
    fields
        .get(field)
        .and_then(Value::as_f64)
        .ok_or(NormalizeError::TypeMismatch {
            field,
            expected: "number",
        })
}

fn history_field(fields: &Map<String, Value>) -> Result<Vec<f64>, NormalizeError> {
    let items = fields
        .get("history")
        .and_then(Value::as_array)
        .ok_or(NormalizeError::TypeMismatch {
            field: "history",
            expected: "array",
        })?;
    items
        .iter()
        .map(|item| {
            item.as_f64().ok_or(NormalizeError::TypeMismatch {
                field: "history",
                expected: "array of numbers",
            })
        })
        .collect()
}

fn signal_field(fields: &Map<String, Value>) -> Result<Signal, NormalizeError> {
    let mismatch = NormalizeError::TypeMismatch {
        field: "signal",
        expected: "one of HOLD, BUY, SELL, Strong Buy, Strong Sell",
    };
    let label = fields
        .get("signal")
        .and_then(Value::as_str)
        .ok_or_else(|| mismatch.clone())?;
    label.parse().map_err(|_| mismatch)
}

fn confidence_field(fields: &Map<String, Value>) -> Result<f64, NormalizeError> {
    fields
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|value| (0.0..=100.0).contains(value))
        .ok_or(NormalizeError::TypeMismatch {
            field: "confidence",
            expected: "number between 0 and 100",
        })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
