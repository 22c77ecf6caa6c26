//! News module - feed models, the canned catalog, and the cached feed service.

mod news_catalog;
mod news_model;
mod news_service;
mod news_traits;

pub use news_catalog::StaticNewsProvider;
pub use news_model::{Article, NewsError, NewsFeed, NewsType};
pub use news_service::{NewsService, DEFAULT_NEWS_TTL, FEED_SOURCE};
pub use news_traits::{NewsProvider, NewsServiceTrait};
