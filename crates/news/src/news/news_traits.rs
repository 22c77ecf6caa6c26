use chrono::{DateTime, Utc};

use super::news_model::{Article, NewsFeed, NewsType};

/// Source of articles for a feed.
pub trait NewsProvider: Send + Sync {
    /// Articles for `news_type`, with publication times relative to `now`.
    fn articles(&self, news_type: NewsType, now: DateTime<Utc>) -> Vec<Article>;
}

/// Trait for news feed service operations
pub trait NewsServiceTrait: Send + Sync {
    fn get_feed(&self, news_type: NewsType) -> NewsFeed;
}
