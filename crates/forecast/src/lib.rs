//! PulseAI prediction gateway.
//!
//! Brokers between the dashboard and an external forecasting process:
//!
//! ```text
//! symbol ──> validate ──> invoke (child process, bounded) ──> normalize ──> enrich
//!               │                 │                               │
//!              400        504 / 404 / 500                        500
//! ```
//!
//! The process is a black box: it receives the canonical symbol as its only
//! argument and prints one object with `currentPrice`, `predictedPrice`,
//! `signal`, `confidence` and `history`, possibly using single quotes.

pub mod errors;
pub mod gateway;
pub mod invoker;
pub mod models;
pub mod normalizer;
pub mod symbol;

pub use errors::{GatewayError, InvokeError, NormalizeError, ValidationError};
pub use gateway::PredictionGateway;
pub use invoker::{ForecastInvoker, ProcessInvoker, DEFAULT_BUDGET};
pub use models::{Currency, EnrichedPrediction, PredictionResult, RawProcessOutput, Signal};
pub use symbol::{validate, Symbol};
