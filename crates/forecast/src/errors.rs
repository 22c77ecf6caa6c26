//! Error taxonomy for the prediction gateway.
//!
//! Each pipeline stage has its own error enum. [`GatewayError`] wraps them and
//! is the only type callers need to inspect: [`GatewayError::kind`] and
//! [`GatewayError::status_code`] give a single, non-overlapping classification
//! for every failure.

use std::time::Duration;

use thiserror::Error;

/// Maximum number of characters of process output carried in an error.
pub const DIAGNOSTIC_LIMIT: usize = 100;

/// Truncates diagnostic text to [`DIAGNOSTIC_LIMIT`] characters.
pub fn truncate_diagnostic(text: &str) -> String {
    text.chars().take(DIAGNOSTIC_LIMIT).collect()
}

/// Rejections produced by the symbol validator.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid stock symbol. Must be 1-15 characters.")]
    EmptyOrTooLong,

    #[error(
        "Invalid stock symbol format. Use uppercase letters, numbers, dots, or hyphens (e.g., AAPL, RELIANCE.NS, BTC-USD)."
    )]
    BadFormat,
}

/// Failures of a single forecasting process invocation.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The process did not finish inside its budget and was killed.
    #[error("Forecast process exceeded its {0:?} budget")]
    Timeout(Duration),

    /// The process reported that it has no data for the symbol.
    #[error("No data found for symbol {0}")]
    SymbolNotFound(String),

    /// The process ran but failed. `diagnostic` is already truncated.
    #[error("Forecast process failed: {diagnostic}")]
    ProcessFailure { diagnostic: String },

    /// The process could not be started at all.
    #[error("Failed to start forecast process '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while turning raw process output into a prediction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// Output is not a structured object even after quote repair.
    ///
    /// `snippet` is truncated for responses; `raw` keeps the full output for logs.
    #[error("Failed to parse forecast output: {message}")]
    ParseError {
        message: String,
        snippet: String,
        raw: String,
    },

    /// Every required field absent from the output, in declaration order.
    #[error("Forecast output is missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Forecast field '{field}' has the wrong type: expected {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },
}

impl NormalizeError {
    pub(crate) fn parse(message: impl Into<String>, text: &str) -> Self {
        NormalizeError::ParseError {
            message: message.into(),
            snippet: truncate_diagnostic(text),
            raw: text.to_string(),
        }
    }

    /// Replaces the diagnostic copy of the output on a parse error.
    pub(crate) fn with_raw(self, original: &str) -> Self {
        match self {
            NormalizeError::ParseError {
                message, snippet, ..
            } => NormalizeError::ParseError {
                message,
                snippet,
                raw: original.to_string(),
            },
            other => other,
        }
    }
}

/// A failed prediction request, tagged with the stage that failed.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{source}")]
    Invoke {
        symbol: String,
        #[source]
        source: InvokeError,
    },

    #[error("{source}")]
    Normalize {
        symbol: String,
        #[source]
        source: NormalizeError,
    },
}

impl GatewayError {
    /// Stable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Validation(ValidationError::EmptyOrTooLong) => "EmptyOrTooLong",
            GatewayError::Validation(ValidationError::BadFormat) => "BadFormat",
            GatewayError::Invoke { source, .. } => match source {
                InvokeError::Timeout(_) => "Timeout",
                InvokeError::SymbolNotFound(_) => "SymbolNotFound",
                InvokeError::ProcessFailure { .. } => "ProcessFailure",
                InvokeError::SpawnError { .. } => "SpawnError",
            },
            GatewayError::Normalize { source, .. } => match source {
                NormalizeError::ParseError { .. } => "ParseError",
                NormalizeError::MissingFields(_) => "MissingFields",
                NormalizeError::TypeMismatch { .. } => "TypeMismatch",
            },
        }
    }

    /// HTTP status for this failure.
    ///
    /// | kind | status |
    /// |------|--------|
    /// | `EmptyOrTooLong`, `BadFormat` | 400 |
    /// | `SymbolNotFound` | 404 |
    /// | `Timeout` | 504 |
    /// | everything else | 500 |
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Validation(_) => 400,
            GatewayError::Invoke { source, .. } => match source {
                InvokeError::Timeout(_) => 504,
                InvokeError::SymbolNotFound(_) => 404,
                InvokeError::ProcessFailure { .. } | InvokeError::SpawnError { .. } => 500,
            },
            GatewayError::Normalize { .. } => 500,
        }
    }

    /// The canonical symbol, once validation has succeeded.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            GatewayError::Validation(_) => None,
            GatewayError::Invoke { symbol, .. } | GatewayError::Normalize { symbol, .. } => {
                Some(symbol)
            }
        }
    }
}
