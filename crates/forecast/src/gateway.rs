//! Prediction request orchestration.
//!
//! `validate -> invoke -> normalize -> enrich`, no retries. The first failing
//! stage decides the error; later stages never run after a failure.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, error, info, warn};

use crate::errors::{GatewayError, InvokeError, NormalizeError};
use crate::invoker::ForecastInvoker;
use crate::models::EnrichedPrediction;
use crate::normalizer::normalize;
use crate::symbol::{validate, Symbol};

pub struct PredictionGateway {
    invoker: Arc<dyn ForecastInvoker>,
    budget: Duration,
}

impl PredictionGateway {
    pub fn new(invoker: Arc<dyn ForecastInvoker>, budget: Duration) -> Self {
        Self { invoker, budget }
    }

    /// Runs one prediction request end to end. Predictions are never cached.
    pub async fn handle_prediction(
        &self,
        input: &str,
    ) -> Result<EnrichedPrediction, GatewayError> {
        let symbol = validate(input).map_err(|e| {
            debug!("Rejected symbol {:?}: {}", input, e);
            GatewayError::from(e)
        })?;

        let raw = self
            .invoker
            .invoke(&symbol, self.budget)
            .await
            .map_err(|e| invoke_failed(&symbol, e))?;

        let prediction = normalize(&raw).map_err(|e| normalize_failed(&symbol, e))?;

        let enriched = EnrichedPrediction::new(prediction, &symbol, Utc::now());
        info!(
            "Prediction for {}: current {} predicted {} ({:?})",
            symbol,
            enriched.prediction.current_price,
            enriched.prediction.predicted_price,
            enriched.currency
        );
        Ok(enriched)
    }
}

fn invoke_failed(symbol: &Symbol, source: InvokeError) -> GatewayError {
    match &source {
        InvokeError::SymbolNotFound(_) => info!("No forecast data for {}", symbol),
        InvokeError::Timeout(budget) => warn!("Forecast for {} timed out after {:?}", symbol, budget),
        InvokeError::ProcessFailure { .. } | InvokeError::SpawnError { .. } => {
            error!("Forecast for {} failed: {}", symbol, source)
        }
    }
    GatewayError::Invoke {
        symbol: symbol.to_string(),
        source,
    }
}

fn normalize_failed(symbol: &Symbol, source: NormalizeError) -> GatewayError {
    match &source {
        NormalizeError::ParseError { message, raw, .. } => {
            error!("Unparsable forecast for {}: {}", symbol, message);
            error!("Raw forecast output: {}", raw);
        }
        other => error!("Invalid forecast for {}: {}", symbol, other),
    }
    GatewayError::Normalize {
        symbol: symbol.to_string(),
        source,
    }
}
