//! Daily market journal collection.
//!
//! A run authorizes the device against the license service, then fetches
//! quotes, scraped page values and a news headline, formats them per
//! [`JournalColumn`] and writes them as one dated row of the journal.
//! Authorization failure stops the run before anything is fetched or written.

mod api_key;
mod cnbc;
mod columns;
mod error;
mod fmp;
mod journal;
mod news;
mod run;
mod sources;
mod workbook;

pub use api_key::{prompt_fmp_key, ApiKeyStore, API_KEY_FILE_NAME};
pub use cnbc::{parse_last_price, quote_url, CnbcScraper, CNBC_QUOTE_BASE};
pub use columns::{
    default_columns, header_row, ColumnSource, JournalColumn, ValueFormat, DATE_HEADER,
    DATE_LABEL_FORMAT, GOLD_SYMBOL, NEWS_HEADER,
};
pub use error::{JournalError, JournalResult};
pub use fmp::{FmpClient, FMP_BASE_URL};
pub use journal::{CsvJournal, JournalFile, SheetWriter};
pub use news::{NewsApiClient, FALLBACK_QUERY, NEWS_API_BASE_URL, NEWS_DOMAINS, PRIMARY_QUERY};
pub use run::{collect_row, date_label, run_journal, write_row, CollectedValue, RunOptions, RunReport};
pub use sources::{NewsSource, NoNews, PageSource, QuoteSource, Sources};
pub use workbook::XlsxJournal;
