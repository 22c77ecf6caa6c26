use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use pulseai_forecast::EnrichedPrediction;

use crate::{error::ApiResult, main_lib::AppState};

/// Runs a fresh forecast for `symbol`. Never served from cache.
async fn predict(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<EnrichedPrediction>> {
    let prediction = state.gateway.handle_prediction(&symbol).await?;
    Ok(Json(prediction))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/predict/{symbol}", get(predict))
}
