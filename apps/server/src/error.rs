use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pulseai_forecast::errors::truncate_diagnostic;
use pulseai_forecast::{GatewayError, InvokeError, NormalizeError};
use pulseai_news::NewsError;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    News(#[from] NewsError),
    #[error("Endpoint not found")]
    RouteNotFound { path: String, method: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Gateway(e) => (
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                gateway_body(e),
            ),
            ApiError::News(e) => (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() })),
            ApiError::RouteNotFound { path, method } => (
                StatusCode::NOT_FOUND,
                json!({ "error": self.to_string(), "path": path, "method": method }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Body of a failed prediction: `{error, kind, stock?, details?, missingFields?}`.
fn gateway_body(err: &GatewayError) -> Value {
    let kind = err.kind();
    match err {
        GatewayError::Validation(e) => json!({ "error": e.to_string(), "kind": kind }),
        GatewayError::Invoke { symbol, source } => match source {
            InvokeError::Timeout(_) => json!({
                "error": "Request timeout. The prediction service took too long to respond.",
                "kind": kind,
                "stock": symbol,
            }),
            InvokeError::SymbolNotFound(_) => json!({
                "error": format!(
                    "No data found for stock symbol: {}. Please check the symbol and try again.",
                    symbol
                ),
                "kind": kind,
                "stock": symbol,
            }),
            InvokeError::ProcessFailure { diagnostic } => json!({
                "error": "Failed to generate prediction. Please try again.",
                "kind": kind,
                "details": diagnostic,
                "stock": symbol,
            }),
            InvokeError::SpawnError { .. } => json!({
                "error": "Internal server error. Please check backend logs.",
                "kind": kind,
                "details": truncate_diagnostic(&source.to_string()),
                "stock": symbol,
            }),
        },
        GatewayError::Normalize { symbol, source } => match source {
            NormalizeError::ParseError {
                message, snippet, ..
            } => json!({
                "error": "Failed to parse prediction response.",
                "kind": kind,
                "details": truncate_diagnostic(&format!("{}: {}", message, snippet)),
                "stock": symbol,
            }),
            NormalizeError::MissingFields(fields) => json!({
                "error": "Invalid response from prediction engine.",
                "kind": kind,
                "missingFields": fields,
                "stock": symbol,
            }),
            NormalizeError::TypeMismatch { field, .. } => {
                let error = match *field {
                    "currentPrice" | "predictedPrice" => {
                        "Invalid price data received from prediction engine."
                    }
                    "history" => "Invalid history data received from prediction engine.",
                    _ => "Invalid response from prediction engine.",
                };
                json!({
                    "error": error,
                    "kind": kind,
                    "details": source.to_string(),
                    "stock": symbol,
                })
            }
        },
    }
}

/// Body for failures nothing else handled. `message` is only revealed in development.
pub fn internal_error_body(message: &str, dev_mode: bool) -> Value {
    let message = if dev_mode {
        message
    } else {
        "Something went wrong"
    };
    json!({ "error": "Internal server error", "message": message })
}

pub type ApiResult<T> = Result<T, ApiError>;
