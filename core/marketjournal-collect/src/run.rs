//! One collection run: authorize, fetch, write.

use crate::columns::{ColumnSource, JournalColumn, DATE_LABEL_FORMAT};
use crate::error::JournalResult;
use crate::journal::SheetWriter;
use crate::sources::Sources;
use chrono::NaiveDate;
use marketjournal_license::{
    Activator, Authorization, DeviceIdentity, LicenseService, Prompt,
};
use tracing::{info, warn};

/// The value collected for one column, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedValue {
    pub header: String,
    pub value: Option<String>,
}

/// Settings for [`run_journal`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_attempts: u32,
    pub columns: Vec<JournalColumn>,
    pub today: NaiveDate,
}

/// What a completed run wrote.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub authorization: Authorization,
    pub row: usize,
    pub written: Vec<String>,
    pub missing: Vec<String>,
}

/// The date label written into the first column.
pub fn date_label(date: NaiveDate) -> String {
    date.format(DATE_LABEL_FORMAT).to_string()
}

/// Fetches and formats a value for every column.
///
/// A source that has nothing yields `None` for its column; the rest of the
/// row is still collected.
pub async fn collect_row(sources: &Sources, columns: &[JournalColumn]) -> Vec<CollectedValue> {
    let mut row = Vec::with_capacity(columns.len());

    for column in columns {
        let value = match &column.source {
            ColumnSource::Quote(symbol) => sources
                .quotes
                .fetch_quote(symbol)
                .await
                .map(|v| column.format.format(v)),
            ColumnSource::Page(url) => sources
                .pages
                .fetch_scraped_value(url)
                .await
                .map(|v| column.format.format(v)),
            ColumnSource::News => sources.news.headline().await,
        };

        if value.is_none() {
            warn!("No data available for {}", column.header);
        }
        row.push(CollectedValue {
            header: column.header.clone(),
            value,
        });
    }

    row
}

/// Writes the date label and every collected value into the next free row,
/// then saves. Returns the row used and the headers actually written.
pub fn write_row<W: SheetWriter>(
    writer: &mut W,
    date: NaiveDate,
    values: &[CollectedValue],
) -> JournalResult<(usize, Vec<String>)> {
    let row = writer.next_row()?;
    writer.write_date(row, &date_label(date))?;
    info!("Using row {} for {}", row, date);

    let mut written = Vec::new();
    for item in values {
        let Some(value) = &item.value else { continue };
        if writer.write_cell(row, &item.header, value)? {
            info!("Updated {} with value: {}", item.header, value);
            written.push(item.header.clone());
        }
    }

    writer.save()?;
    Ok((row, written))
}

/// Runs one journal entry end to end.
///
/// Authorization comes first. If it fails the error is returned before
/// `build_sources` is called or `writer` is touched.
pub async fn run_journal<S, D, P, W, F>(
    activator: &mut Activator<S, D, P>,
    options: &RunOptions,
    build_sources: F,
    writer: &mut W,
) -> JournalResult<RunReport>
where
    S: LicenseService,
    D: DeviceIdentity,
    P: Prompt,
    W: SheetWriter,
    F: FnOnce() -> JournalResult<Sources>,
{
    let authorization = activator.authorize(options.max_attempts).await?;
    info!("Device {} authorized", authorization.device_id);

    let sources = build_sources()?;
    let values = collect_row(&sources, &options.columns).await;
    let missing = values
        .iter()
        .filter(|v| v.value.is_none())
        .map(|v| v.header.clone())
        .collect();

    let (row, written) = write_row(writer, options.today, &values)?;

    Ok(RunReport {
        authorization,
        row,
        written,
        missing,
    })
}
