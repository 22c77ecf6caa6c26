use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use pulseai_forecast::DEFAULT_BUDGET;
use pulseai_news::news::DEFAULT_NEWS_TTL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Anything other than `json` (any case) falls back to text.
    fn from_setting(value: Option<String>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub forecast_program: String,
    pub forecast_args: Vec<String>,
    pub forecast_timeout: Duration,
    pub news_ttl: Duration,
    /// Exposes internal error messages in 500 responses.
    pub dev_mode: bool,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let listen_addr: SocketAddr = match var("PULSE_LISTEN_ADDR") {
            Some(addr) => addr
                .parse()
                .with_context(|| format!("Invalid PULSE_LISTEN_ADDR '{}'", addr))?,
            None => {
                let port = var("PORT").unwrap_or_else(|| "5000".into());
                format!("0.0.0.0:{}", port)
                    .parse()
                    .with_context(|| format!("Invalid PORT '{}'", port))?
            }
        };
        let cors_allow = var("PULSE_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let millis = |key: &str, default: Duration| {
            var(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };
        let request_timeout = millis("PULSE_REQUEST_TIMEOUT_MS", Duration::from_millis(35_000));
        let forecast_timeout = millis("PULSE_FORECAST_TIMEOUT_MS", DEFAULT_BUDGET);
        let news_ttl = var("PULSE_NEWS_TTL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_NEWS_TTL);
        let forecast_program = var("PULSE_FORECAST_PROGRAM").unwrap_or_else(|| "python".into());
        let forecast_args = var("PULSE_FORECAST_ARGS")
            .unwrap_or_else(|| "ml/predict.py".into())
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let dev_mode = var("PULSE_ENV")
            .map(|env| env.eq_ignore_ascii_case("development"))
            .unwrap_or(false);
        let log_format = LogFormat::from_setting(var("PULSE_LOG_FORMAT"));

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout,
            forecast_program,
            forecast_args,
            forecast_timeout,
            news_ttl,
            dev_mode,
            log_format,
        })
    }
}
