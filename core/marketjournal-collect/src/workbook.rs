//! The journal kept as an Excel workbook.

use crate::error::{JournalError, JournalResult};
use crate::journal::SheetWriter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use umya_spreadsheet::{Spreadsheet, Worksheet};

/// Sheet row (1-based) of the header.
const HEADER_ROW: u32 = 1;

/// Sheet column (1-based) holding the date label.
const DATE_COLUMN: u32 = 1;

/// A journal kept in the active sheet of an `.xlsx` workbook.
///
/// The workbook is read, updated and written back whole, so formatting and
/// any other sheets in it survive. Row 1 holds the headers and column A the
/// date labels. Values are stored as text, already formatted. A missing
/// workbook is created with `default_headers`.
pub struct XlsxJournal {
    path: PathBuf,
    default_headers: Vec<String>,
    book: Option<Spreadsheet>,
}

impl XlsxJournal {
    pub fn new(path: impl Into<PathBuf>, default_headers: Vec<String>) -> Self {
        Self {
            path: path.into(),
            default_headers,
            book: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sheet(&mut self) -> JournalResult<&mut Worksheet> {
        let book = match self.book.take() {
            Some(book) => book,
            None => self.load()?,
        };
        Ok(self.book.insert(book).get_active_sheet_mut())
    }

    fn load(&self) -> JournalResult<Spreadsheet> {
        if self.path.exists() {
            return umya_spreadsheet::reader::xlsx::read(&self.path).map_err(|e| {
                JournalError::Workbook(format!("cannot read {}: {e}", self.path.display()))
            });
        }

        info!("Workbook {:?} not found; a new one will be created", self.path);
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_active_sheet_mut();
        for (col, header) in (1u32..).zip(&self.default_headers) {
            sheet
                .get_cell_mut((col, HEADER_ROW))
                .set_value_string(header.as_str());
        }
        Ok(book)
    }
}

/// Sheet row number of data row `row`.
fn sheet_row(row: usize) -> JournalResult<u32> {
    u32::try_from(row)
        .ok()
        .and_then(|r| r.checked_add(HEADER_ROW + 1))
        .ok_or(JournalError::RowOutOfRange(row))
}

fn column_number(sheet: &Worksheet, column_name: &str) -> Option<u32> {
    let wanted = column_name.trim();
    (1..=sheet.get_highest_column())
        .find(|&col| sheet.get_value((col, HEADER_ROW)).trim() == wanted)
}

impl SheetWriter for XlsxJournal {
    fn next_row(&mut self) -> JournalResult<usize> {
        let sheet = self.sheet()?;
        let last = sheet.get_highest_row().max(HEADER_ROW);

        let target = (HEADER_ROW + 1..=last)
            .find(|&r| sheet.get_value((DATE_COLUMN, r)).trim().is_empty())
            .unwrap_or(last + 1);

        Ok((target - HEADER_ROW - 1) as usize)
    }

    fn write_cell(&mut self, row: usize, column_name: &str, value: &str) -> JournalResult<bool> {
        let sheet_row = sheet_row(row)?;
        let sheet = self.sheet()?;
        let Some(col) = column_number(sheet, column_name) else {
            warn!("Column {:?} not found in the workbook", column_name);
            return Ok(false);
        };

        sheet.get_cell_mut((col, sheet_row)).set_value_string(value);
        Ok(true)
    }

    fn write_date(&mut self, row: usize, label: &str) -> JournalResult<()> {
        let sheet_row = sheet_row(row)?;
        self.sheet()?
            .get_cell_mut((DATE_COLUMN, sheet_row))
            .set_value_string(label);
        Ok(())
    }

    fn save(&mut self) -> JournalResult<()> {
        let path = self.path.clone();
        self.sheet()?;
        let Some(book) = self.book.as_ref() else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write beside the workbook and swap in, so a failed save keeps the old file.
        let tmp = path.with_extension("xlsx.tmp");
        umya_spreadsheet::writer::xlsx::write(book, &tmp)
            .map_err(|e| JournalError::Workbook(format!("cannot write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path)?;

        info!("Workbook saved: {:?}", path);
        Ok(())
    }
}
