//! News domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NewsError {
    #[error("Invalid news type. Use 'stock' or 'crypto'.")]
    InvalidType(String),
}

/// Feed category requested by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsType {
    Stock,
    Crypto,
}

impl NewsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsType::Stock => "stock",
            NewsType::Crypto => "crypto",
        }
    }

    /// Cache key under which this feed is stored.
    pub fn cache_key(&self) -> String {
        format!("news_{}", self.as_str())
    }
}

impl fmt::Display for NewsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewsType {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stock" => Ok(NewsType::Stock),
            "crypto" => Ok(NewsType::Crypto),
            _ => Err(NewsError::InvalidType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub source: String,
    pub published: DateTime<Utc>,
    pub url: String,
    pub image: Option<String>,
}

/// Payload of `GET /api/news/{type}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsFeed {
    #[serde(rename = "type")]
    pub news_type: NewsType,
    pub articles: Vec<Article>,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}
