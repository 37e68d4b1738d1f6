//! Financial Modeling Prep quote client.

use crate::error::{JournalError, JournalResult};
use crate::sources::QuoteSource;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

/// Production API root.
pub const FMP_BASE_URL: &str = "https://financialmodelingprep.com";

const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct FmpQuote {
    price: Option<f64>,
}

/// Latest prices from `GET /api/v3/quote/{symbol}`.
#[derive(Debug, Clone)]
pub struct FmpClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl FmpClient {
    pub fn new(api_key: impl Into<String>) -> JournalResult<Self> {
        Self::with_base_url(FMP_BASE_URL, api_key)
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

    /// Price of the first quote returned for `symbol`.
    pub async fn quote(&self, symbol: &str) -> JournalResult<f64> {
        let url = format!("{}/api/v3/quote/{}", self.base_url, symbol);
        let quotes: Vec<FmpQuote> = self
            .client
            .get(&url)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        quotes
            .first()
            .and_then(|q| q.price)
            .ok_or_else(|| JournalError::Parse(format!("no quote returned for {symbol}")))
    }
}

#[async_trait]
impl QuoteSource for FmpClient {
    async fn fetch_quote(&self, symbol: &str) -> Option<f64> {
        match self.quote(symbol).await {
            Ok(price) => {
                debug!("Fetched {} = {}", symbol, price);
                Some(price)
            }
            Err(e) => {
                error!("Error fetching data for {}: {}", symbol, e);
                None
            }
        }
    }
}
