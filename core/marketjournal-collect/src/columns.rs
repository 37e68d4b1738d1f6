//! Which value goes into which journal column, and how it is printed.

use crate::cnbc::quote_url;

/// Header of the first column, holding the date label.
pub const DATE_HEADER: &str = "Date";

/// Header of the news column.
pub const NEWS_HEADER: &str = "Short DAILY NEWS ITEM(S) that affected one or more of today's prices";

/// Financial Modeling Prep symbol for spot gold in US dollars.
pub const GOLD_SYMBOL: &str = "GCUSD";

/// Format of the date label, e.g. `Tuesday, September 10, 2024`.
pub const DATE_LABEL_FORMAT: &str = "%A, %B %d, %Y";

/// Where a column's value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    /// A [`QuoteSource`](crate::QuoteSource) symbol.
    Quote(String),
    /// A page read by a [`PageSource`](crate::PageSource).
    Page(String),
    /// The [`NewsSource`](crate::NewsSource) headline.
    News,
}

/// Fixed-point rendering of a numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueFormat {
    pub decimals: usize,
    /// Append a `%` sign.
    pub percent: bool,
}

impl ValueFormat {
    pub const fn fixed(decimals: usize) -> Self {
        Self {
            decimals,
            percent: false,
        }
    }

    pub const fn percent(decimals: usize) -> Self {
        Self {
            decimals,
            percent: true,
        }
    }

    pub fn format(&self, value: f64) -> String {
        let mut out = format!("{value:.prec$}", prec = self.decimals);
        if self.percent {
            out.push('%');
        }
        out
    }
}

/// One column of the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalColumn {
    pub header: String,
    pub source: ColumnSource,
    pub format: ValueFormat,
}

impl JournalColumn {
    pub fn quote(header: &str, symbol: &str, format: ValueFormat) -> Self {
        Self {
            header: header.to_string(),
            source: ColumnSource::Quote(symbol.to_string()),
            format,
        }
    }

    pub fn cnbc(header: &str, symbol: &str, format: ValueFormat) -> Self {
        Self {
            header: header.to_string(),
            source: ColumnSource::Page(quote_url(symbol)),
            format,
        }
    }

    pub fn news() -> Self {
        Self {
            header: NEWS_HEADER.to_string(),
            source: ColumnSource::News,
            format: ValueFormat::fixed(0),
        }
    }
}

/// The standard journal layout.
pub fn default_columns() -> Vec<JournalColumn> {
    let two = ValueFormat::fixed(2);
    let four = ValueFormat::fixed(4);
    let yield_pct = ValueFormat::percent(2);

    vec![
        JournalColumn::quote("EURO/USD", "EURUSD", four),
        JournalColumn::quote("STG/USD", "GBPUSD", four),
        JournalColumn::quote("USD/YEN", "USDJPY", two),
        JournalColumn::quote("NIKKEI", "^N225", two),
        JournalColumn::cnbc("DAX", ".GDAXI", two),
        JournalColumn::quote("FTSE", "^FTSE", two),
        JournalColumn::quote("DOW", "^DJI", two),
        JournalColumn::quote("S&P", "^GSPC", two),
        JournalColumn::cnbc("US 10 YR (%)", "US10Y", yield_pct),
        JournalColumn::cnbc("GERMAN 10 YR (%)", "DE10Y", yield_pct),
        JournalColumn::cnbc("UK 10 YR (%)", "UK10Y", yield_pct),
        JournalColumn::cnbc("JAPAN 10 YR (%)", "JP10Y", yield_pct),
        JournalColumn::quote("GOLD", GOLD_SYMBOL, two),
        JournalColumn::cnbc("BRENT CRUDE", "%40LCO.1", two),
        JournalColumn::cnbc("BITCOIN", "BTC.CM%3D", two),
        JournalColumn::news(),
    ]
}

/// Header row for a journal with `columns`: the date column first.
pub fn header_row(columns: &[JournalColumn]) -> Vec<String> {
    std::iter::once(DATE_HEADER.to_string())
        .chain(columns.iter().map(|c| c.header.clone()))
        .collect()
}
