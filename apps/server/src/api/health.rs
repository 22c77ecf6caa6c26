use std::sync::Arc;

use axum::{routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::main_lib::AppState;

#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    timestamp: DateTime<Utc>,
    version: &'static str,
}

/// Landing route the dashboard pings to check the backend is up.
async fn service_status() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "PulseAI Backend is running",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn healthz() -> &'static str {
    "ok"
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(service_status))
        .route("/healthz", get(healthz))
}
