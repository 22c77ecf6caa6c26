//! PulseAI auxiliary content.
//!
//! - [`cache`]: the expiring in-memory cache shared by content endpoints.
//! - [`news`]: the news feed served to the dashboard, cached per feed type.

pub mod cache;
pub mod news;

pub use cache::{get_or_compute, CacheEntry, CacheStore, ExpiringCache};
pub use news::{
    Article, NewsError, NewsFeed, NewsProvider, NewsService, NewsServiceTrait, NewsType,
    StaticNewsProvider,
};
