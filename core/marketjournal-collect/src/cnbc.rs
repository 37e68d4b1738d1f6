//! CNBC quote page scraper.

use crate::error::{JournalError, JournalResult};
use crate::sources::PageSource;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, error};

/// Base of every CNBC quote page.
pub const CNBC_QUOTE_BASE: &str = "https://www.cnbc.com/quotes";

const LAST_PRICE_SELECTOR: &str = "span.QuoteStrip-lastPrice";
const USER_AGENT: &str = "Mozilla/5.0";
const TIMEOUT: Duration = Duration::from_secs(10);

/// Quote page URL for a CNBC symbol. The symbol is used as given, so
/// reserved characters must already be percent-encoded (`%40LCO.1`).
pub fn quote_url(symbol: &str) -> String {
    format!("{CNBC_QUOTE_BASE}/{symbol}")
}

/// Reads the last price from a CNBC quote page.
#[derive(Debug, Clone)]
pub struct CnbcScraper {
    client: Client,
}

impl CnbcScraper {
    pub fn new() -> JournalResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    async fn scrape(&self, url: &str) -> JournalResult<f64> {
        let text = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_last_price(&text)
    }
}

#[async_trait]
impl PageSource for CnbcScraper {
    async fn fetch_scraped_value(&self, url: &str) -> Option<f64> {
        match self.scrape(url).await {
            Ok(value) => {
                debug!("Scraped {} from {}", value, url);
                Some(value)
            }
            Err(e) => {
                error!("Error fetching data from CNBC for {}: {}", url, e);
                None
            }
        }
    }
}

/// Extracts the `QuoteStrip-lastPrice` value from a quote page.
///
/// Thousands separators and a trailing percent sign are stripped.
pub fn parse_last_price(html: &str) -> JournalResult<f64> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(LAST_PRICE_SELECTOR)
        .map_err(|why| JournalError::Parse(format!("bad selector: {why:?}")))?;

    let raw = document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .ok_or_else(|| JournalError::Parse("could not find the value on the page".into()))?;

    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '%')
        .collect();
    cleaned
        .trim()
        .parse()
        .map_err(|_| JournalError::Parse(format!("not a number: {raw:?}")))
}
