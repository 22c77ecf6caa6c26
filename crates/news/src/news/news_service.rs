use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::info;

use crate::cache::{get_or_compute, CacheStore};

use super::news_model::{NewsFeed, NewsType};
use super::news_traits::{NewsProvider, NewsServiceTrait};

/// How long a generated feed is served from cache.
pub const DEFAULT_NEWS_TTL: Duration = Duration::from_secs(60 * 60);

/// Value of the `source` field of every feed.
pub const FEED_SOURCE: &str = "PulseAI";

pub struct NewsService {
    provider: Arc<dyn NewsProvider>,
    cache: Arc<dyn CacheStore<NewsFeed>>,
    ttl: Duration,
}

impl NewsService {
    pub fn new(
        provider: Arc<dyn NewsProvider>,
        cache: Arc<dyn CacheStore<NewsFeed>>,
        ttl: Duration,
    ) -> Self {
        NewsService {
            provider,
            cache,
            ttl,
        }
    }
}

impl NewsServiceTrait for NewsService {
    fn get_feed(&self, news_type: NewsType) -> NewsFeed {
        get_or_compute(
            self.cache.as_ref(),
            &news_type.cache_key(),
            self.ttl,
            || {
                let now = Utc::now();
                let articles = self.provider.articles(news_type, now);
                info!("Built {} news feed ({} items)", news_type, articles.len());
                NewsFeed {
                    news_type,
                    articles,
                    timestamp: now,
                    source: FEED_SOURCE.to_string(),
                }
            },
        )
    }
}
