//! The journal file the run appends to.

use crate::error::{JournalError, JournalResult};
use crate::workbook::XlsxJournal;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Row-and-column access to a journal sheet.
///
/// Rows are zero-based data rows; the header row is not counted.
pub trait SheetWriter {
    /// The row the next entry goes into: the first row with an empty date
    /// cell, or a new row at the end.
    fn next_row(&mut self) -> JournalResult<usize>;

    /// Writes `value` under the column headed `column_name`.
    ///
    /// Header comparison ignores surrounding whitespace. Returns `false`
    /// without writing if the sheet has no such column.
    fn write_cell(&mut self, row: usize, column_name: &str, value: &str) -> JournalResult<bool>;

    /// Writes the date label into the first column, whatever its header says.
    ///
    /// This is the cell [`next_row`](SheetWriter::next_row) checks.
    fn write_date(&mut self, row: usize, label: &str) -> JournalResult<()>;

    /// Persists every change.
    fn save(&mut self) -> JournalResult<()>;
}

#[derive(Debug, Clone)]
struct Sheet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    /// The row's cells, padded to the header width (and at least the date cell).
    fn row_mut(&mut self, row: usize) -> JournalResult<&mut Vec<String>> {
        let width = self.headers.len().max(1);
        let cells = self
            .rows
            .get_mut(row)
            .ok_or(JournalError::RowOutOfRange(row))?;
        if cells.len() < width {
            cells.resize(width, String::new());
        }
        Ok(cells)
    }
}

/// A journal kept as a CSV file.
///
/// Nothing is read from or written to disk until the sheet is first used.
/// A missing file is created with `default_headers` on [`save`](SheetWriter::save).
#[derive(Debug, Clone)]
pub struct CsvJournal {
    path: PathBuf,
    default_headers: Vec<String>,
    sheet: Option<Sheet>,
}

impl CsvJournal {
    pub fn new(path: impl Into<PathBuf>, default_headers: Vec<String>) -> Self {
        Self {
            path: path.into(),
            default_headers,
            sheet: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header row, loading the file if needed.
    pub fn headers(&mut self) -> JournalResult<&[String]> {
        Ok(&self.sheet()?.headers)
    }

    /// Cell contents, loading the file if needed.
    pub fn cell(&mut self, row: usize, column_name: &str) -> JournalResult<Option<&str>> {
        let sheet = self.sheet()?;
        let Some(col) = column_index(&sheet.headers, column_name) else {
            return Ok(None);
        };
        Ok(sheet
            .rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str))
    }

    fn sheet(&mut self) -> JournalResult<&mut Sheet> {
        let sheet = match self.sheet.take() {
            Some(sheet) => sheet,
            None => self.load()?,
        };
        Ok(self.sheet.insert(sheet))
    }

    fn load(&self) -> JournalResult<Sheet> {
        if !self.path.exists() {
            info!("Journal {:?} not found; a new one will be created", self.path);
            return Ok(Sheet {
                headers: self.default_headers.clone(),
                rows: Vec::new(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let mut headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        if headers.iter().all(|h| h.trim().is_empty()) {
            headers = self.default_headers.clone();
        }

        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(String::from).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

        Ok(Sheet { headers, rows })
    }
}

fn column_index(headers: &[String], column_name: &str) -> Option<usize> {
    let wanted = column_name.trim();
    headers.iter().position(|h| h.trim() == wanted)
}

impl SheetWriter for CsvJournal {
    fn next_row(&mut self) -> JournalResult<usize> {
        let sheet = self.sheet()?;
        let empty = sheet
            .rows
            .iter()
            .position(|r| r.first().is_none_or(|date| date.trim().is_empty()));

        Ok(match empty {
            Some(row) => row,
            None => {
                sheet.rows.push(vec![String::new(); sheet.headers.len()]);
                sheet.rows.len() - 1
            }
        })
    }

    fn write_cell(&mut self, row: usize, column_name: &str, value: &str) -> JournalResult<bool> {
        let sheet = self.sheet()?;
        let Some(col) = column_index(&sheet.headers, column_name) else {
            warn!("Column {:?} not found in the journal", column_name);
            return Ok(false);
        };

        sheet.row_mut(row)?[col] = value.to_string();
        Ok(true)
    }

    fn write_date(&mut self, row: usize, label: &str) -> JournalResult<()> {
        self.sheet()?.row_mut(row)?[0] = label.to_string();
        Ok(())
    }

    fn save(&mut self) -> JournalResult<()> {
        let path = self.path.clone();
        let sheet = self.sheet()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write beside the journal and swap in, so a failed save keeps the old file.
        let tmp = path.with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new().flexible(true).from_path(&tmp)?;
            writer.write_record(&sheet.headers)?;
            for row in &sheet.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &path)?;

        info!("Journal saved: {:?}", path);
        Ok(())
    }
}

/// The journal at a path, picked by file extension.
///
/// `.csv` files are kept as CSV; anything else is treated as an Excel
/// workbook and updated in place.
pub enum JournalFile {
    Csv(CsvJournal),
    Workbook(XlsxJournal),
}

impl JournalFile {
    pub fn open(path: impl Into<PathBuf>, default_headers: Vec<String>) -> Self {
        let path = path.into();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            Self::Csv(CsvJournal::new(path, default_headers))
        } else {
            Self::Workbook(XlsxJournal::new(path, default_headers))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Csv(journal) => journal.path(),
            Self::Workbook(journal) => journal.path(),
        }
    }
}

impl SheetWriter for JournalFile {
    fn next_row(&mut self) -> JournalResult<usize> {
        match self {
            Self::Csv(journal) => journal.next_row(),
            Self::Workbook(journal) => journal.next_row(),
        }
    }

    fn write_cell(&mut self, row: usize, column_name: &str, value: &str) -> JournalResult<bool> {
        match self {
            Self::Csv(journal) => journal.write_cell(row, column_name, value),
            Self::Workbook(journal) => journal.write_cell(row, column_name, value),
        }
    }

    fn write_date(&mut self, row: usize, label: &str) -> JournalResult<()> {
        match self {
            Self::Csv(journal) => journal.write_date(row, label),
            Self::Workbook(journal) => journal.write_date(row, label),
        }
    }

    fn save(&mut self) -> JournalResult<()> {
        match self {
            Self::Csv(journal) => journal.save(),
            Self::Workbook(journal) => journal.save(),
        }
    }
}
