use std::sync::Arc;

use crate::config::{Config, LogFormat};
use pulseai_forecast::{ForecastInvoker, PredictionGateway, ProcessInvoker};
use pulseai_news::{ExpiringCache, NewsFeed, NewsService, NewsServiceTrait, StaticNewsProvider};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub gateway: Arc<PredictionGateway>,
    pub news_service: Arc<dyn NewsServiceTrait + Send + Sync>,
}

pub fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format == LogFormat::Json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    if config.forecast_program.trim().is_empty() {
        anyhow::bail!("PULSE_FORECAST_PROGRAM must not be empty");
    }
    if config.request_timeout <= config.forecast_timeout {
        tracing::warn!(
            "Request timeout {:?} does not exceed forecast budget {:?}; slow forecasts will surface as 408 instead of 504",
            config.request_timeout,
            config.forecast_timeout
        );
    }

    let invoker: Arc<dyn ForecastInvoker> = Arc::new(ProcessInvoker::new(
        config.forecast_program.clone(),
        config.forecast_args.clone(),
    ));
    tracing::info!(
        "Forecast command: {} {} <SYMBOL> (budget {:?})",
        config.forecast_program,
        config.forecast_args.join(" "),
        config.forecast_timeout
    );
    let gateway = Arc::new(PredictionGateway::new(invoker, config.forecast_timeout));

    // The news cache lives for the whole process and starts empty.
    let news_cache = Arc::new(ExpiringCache::<NewsFeed>::new());
    let news_service: Arc<dyn NewsServiceTrait + Send + Sync> = Arc::new(NewsService::new(
        Arc::new(StaticNewsProvider),
        news_cache,
        config.news_ttl,
    ));

    Ok(Arc::new(AppState {
        gateway,
        news_service,
    }))
}
