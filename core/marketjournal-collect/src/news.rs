//! Headline lookup through newsapi.org.

use crate::error::JournalResult;
use crate::sources::NewsSource;
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Production API root.
pub const NEWS_API_BASE_URL: &str = "https://newsapi.org";

/// Outlets searched for headlines.
pub const NEWS_DOMAINS: &str = "wsj.com,reuters.com,bloomberg.com,ft.com,cnbc.com,economist.com";

/// Preferred query: news about something moving the market.
pub const PRIMARY_QUERY: &str = "(economy OR finance OR market) AND (impact OR affect OR influence)";

/// Broader query tried when the preferred one finds nothing.
pub const FALLBACK_QUERY: &str = "business OR stock OR trade";

const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct Everything {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    source: Option<ArticleSource>,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

impl Article {
    /// `"{title} - {source}"`, or just the title when the source is unnamed.
    fn headline(&self) -> Option<String> {
        let title = self.title.as_deref()?.trim();
        if title.is_empty() {
            return None;
        }
        match self.source.as_ref().and_then(|s| s.name.as_deref()) {
            Some(source) => Some(format!("{title} - {source}")),
            None => Some(title.to_string()),
        }
    }
}

/// Searches `/v2/everything` for yesterday's and today's financial news.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl NewsApiClient {
    pub fn new(api_key: impl Into<String>) -> JournalResult<Self> {
        Self::with_base_url(NEWS_API_BASE_URL, api_key)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> JournalResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: Client::builder().timeout(TIMEOUT).build()?,
        })
    }

    /// Top headline published on `today` or the day before.
    ///
    /// Tries [`PRIMARY_QUERY`] first, then [`FALLBACK_QUERY`].
    pub async fn headline_on(&self, today: NaiveDate) -> JournalResult<Option<String>> {
        let yesterday = today - Days::new(1);

        for query in [PRIMARY_QUERY, FALLBACK_QUERY] {
            if let Some(headline) = self.search(query, yesterday, today).await? {
                return Ok(Some(headline));
            }
            debug!("No recent articles for query {:?}", query);
        }
        Ok(None)
    }

    async fn search(
        &self,
        query: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> JournalResult<Option<String>> {
        let from_param = from.to_string();
        let to_param = to.to_string();
        let body: Everything = self
            .client
            .get(format!("{}/v2/everything", self.base_url))
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("language", "en"),
                ("q", query),
                ("sortBy", "publishedAt"),
                ("from", from_param.as_str()),
                ("to", to_param.as_str()),
                ("domains", NEWS_DOMAINS),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body
            .articles
            .iter()
            .filter(|a| a.published_at.is_none_or(|at| at.date_naive() >= from))
            .find_map(Article::headline))
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn headline(&self) -> Option<String> {
        match self.headline_on(Utc::now().date_naive()).await {
            Ok(Some(headline)) => Some(headline),
            Ok(None) => {
                warn!("Unable to fetch recent economic news");
                None
            }
            Err(e) => {
                error!("Error fetching news: {}", e);
                None
            }
        }
    }
}
