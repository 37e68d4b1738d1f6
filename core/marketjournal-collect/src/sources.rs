//! Data sources read during a collection run.
//!
//! Every source degrades to `None`: a failed fetch is logged by the
//! implementation and the run continues without that value.

use async_trait::async_trait;
use std::sync::Arc;

/// Latest price for a market symbol.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Option<f64>;
}

/// A single number scraped from a web page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_scraped_value(&self, url: &str) -> Option<f64>;
}

/// One headline summarizing the day's market news.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn headline(&self) -> Option<String>;
}

/// The set of sources a run reads from.
#[derive(Clone)]
pub struct Sources {
    pub quotes: Arc<dyn QuoteSource>,
    pub pages: Arc<dyn PageSource>,
    pub news: Arc<dyn NewsSource>,
}

impl Sources {
    pub fn new(
        quotes: Arc<dyn QuoteSource>,
        pages: Arc<dyn PageSource>,
        news: Arc<dyn NewsSource>,
    ) -> Self {
        Self {
            quotes,
            pages,
            news,
        }
    }
}

/// A news source that never has anything. Used when no news API key is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNews;

#[async_trait]
impl NewsSource for NoNews {
    async fn headline(&self) -> Option<String> {
        None
    }
}
