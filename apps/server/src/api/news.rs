use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use pulseai_news::{NewsFeed, NewsType};

use crate::{error::ApiResult, main_lib::AppState};

async fn get_news(
    Path(news_type): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<NewsFeed>> {
    let news_type: NewsType = news_type.parse()?;
    Ok(Json(state.news_service.get_feed(news_type)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/news/{news_type}", get(get_news))
}
