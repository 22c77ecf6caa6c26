//! Prediction payloads.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::symbol::Symbol;

/// Output of the forecasting process, untrusted until normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProcessOutput(String);

impl RawProcessOutput {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RawProcessOutput {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RawProcessOutput {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Trading signal. Serialized with the labels the dashboard renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Signal {
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "Strong Sell")]
    StrongSell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSignal(pub String);

impl FromStr for Signal {
    type Err = UnknownSignal;

    /// Case-insensitive; spaces, underscores and hyphens are ignored, so
    /// `"BUY"`, `"Strong Buy"` and `"strong_sell"` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "hold" => Ok(Signal::Hold),
            "buy" => Ok(Signal::Buy),
            "strongbuy" => Ok(Signal::StrongBuy),
            "sell" => Ok(Signal::Sell),
            "strongsell" => Ok(Signal::StrongSell),
            _ => Err(UnknownSignal(s.to_string())),
        }
    }
}

/// Display currency attached to a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Currency {
    #[serde(rename = "USD ($)")]
    Usd,
    #[serde(rename = "INR (₹)")]
    Inr,
}

/// A validated forecast, exactly as the process reported it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub current_price: f64,
    pub predicted_price: f64,
    pub signal: Signal,
    pub confidence: f64,
    pub history: Vec<f64>,
    /// Extra fields printed by the process, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response payload for a successful prediction request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedPrediction {
    #[serde(flatten)]
    pub prediction: PredictionResult,
    pub currency: Currency,
    pub timestamp: DateTime<Utc>,
    pub stock: String,
}

impl EnrichedPrediction {
    pub fn new(prediction: PredictionResult, symbol: &Symbol, timestamp: DateTime<Utc>) -> Self {
        Self {
            prediction,
            currency: symbol.currency(),
            timestamp,
            stock: symbol.to_string(),
        }
    }
}
