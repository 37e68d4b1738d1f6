use chrono::NaiveDate;
use marketjournal_collect::{write_row, CollectedValue, JournalFile, SheetWriter, XlsxJournal};
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::TempDir;

fn headers() -> Vec<String> {
    ["Date", "EURO/USD", "GOLD"].map(String::from).to_vec()
}

fn values(euro: &str, gold: Option<&str>) -> Vec<CollectedValue> {
    vec![
        CollectedValue {
            header: "EURO/USD".into(),
            value: Some(euro.into()),
        },
        CollectedValue {
            header: "GOLD".into(),
            value: gold.map(String::from),
        },
    ]
}

/// A template like the class workbook: headers, one filled row and a
/// notes column the run must not touch.
fn write_template(path: &Path) {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_active_sheet_mut();
    for (col, header) in [(1u32, "Day"), (2, "EURO/USD"), (3, "GOLD"), (4, "Notes")] {
        sheet.get_cell_mut((col, 1u32)).set_value_string(header);
    }
    sheet.get_cell_mut((1u32, 2u32)).set_value_string("Friday, September 06, 2024");
    sheet.get_cell_mut((2u32, 2u32)).set_value_string("1.1080");
    sheet.get_cell_mut((4u32, 2u32)).set_value_string("jobs report");
    umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
}

fn value(path: &Path, col: u32, row: u32) -> String {
    let book = umya_spreadsheet::reader::xlsx::read(path).unwrap();
    book.get_active_sheet().get_value((col, row))
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 9).unwrap()
}

fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 10).unwrap()
}

#[test]
fn appends_to_existing_template_across_runs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Market Journal.xlsx");
    write_template(&path);

    let mut first = XlsxJournal::new(&path, headers());
    let (row, written) =
        write_row(&mut first, monday(), &values("1.1023", Some("2516.30"))).unwrap();
    assert_eq!(row, 1);
    assert_eq!(written, vec!["EURO/USD".to_string(), "GOLD".to_string()]);

    let mut second = XlsxJournal::new(&path, headers());
    let (row, _) = write_row(&mut second, tuesday(), &values("1.1050", None)).unwrap();
    assert_eq!(row, 2);

    assert_eq!(value(&path, 1, 2), "Friday, September 06, 2024");
    assert_eq!(value(&path, 4, 2), "jobs report");
    assert_eq!(value(&path, 1, 3), "Monday, September 09, 2024");
    assert_eq!(value(&path, 2, 3), "1.1023");
    assert_eq!(value(&path, 3, 3), "2516.30");
    assert_eq!(value(&path, 1, 4), "Tuesday, September 10, 2024");
    assert_eq!(value(&path, 2, 4), "1.1050");
    assert_eq!(value(&path, 3, 4), "");
    assert!(!path.with_extension("xlsx.tmp").exists());
}

#[test]
fn fills_first_row_without_a_date() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("journal.xlsx");
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_active_sheet_mut();
    sheet.get_cell_mut((1u32, 1u32)).set_value_string("Date");
    sheet.get_cell_mut((1u32, 2u32)).set_value_string("Monday");
    sheet.get_cell_mut((2u32, 3u32)).set_value_string("stray");
    sheet.get_cell_mut((1u32, 4u32)).set_value_string("Wednesday");
    umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();

    let mut journal = XlsxJournal::new(&path, headers());
    assert_eq!(journal.next_row().unwrap(), 1);
}

#[test]
fn missing_workbook_is_created_with_headers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/journal.xlsx");

    let mut journal = XlsxJournal::new(&path, headers());
    write_row(&mut journal, monday(), &values("1.1023", None)).unwrap();

    assert_eq!(value(&path, 1, 1), "Date");
    assert_eq!(value(&path, 3, 1), "GOLD");
    assert_eq!(value(&path, 1, 2), "Monday, September 09, 2024");
    assert_eq!(value(&path, 2, 2), "1.1023");
}

#[test]
fn unknown_column_is_skipped() {
    let dir = TempDir::new().unwrap();
    let mut journal = XlsxJournal::new(dir.path().join("j.xlsx"), headers());
    let row = journal.next_row().unwrap();
    assert!(!journal.write_cell(row, "BITCOIN", "60000.00").unwrap());
    assert!(journal.write_cell(row, " GOLD ", "2516.30").unwrap());
}

#[test]
fn journal_file_picks_format_by_extension() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        JournalFile::open(dir.path().join("j.CSV"), headers()),
        JournalFile::Csv(_)
    ));
    assert!(matches!(
        JournalFile::open(dir.path().join("j.xlsx"), headers()),
        JournalFile::Workbook(_)
    ));

    let path = dir.path().join("j.xlsx");
    let mut journal = JournalFile::open(&path, headers());
    write_row(&mut journal, tuesday(), &values("1.1050", None)).unwrap();
    assert_eq!(journal.path(), path.as_path());
    assert_eq!(value(&path, 1, 2), "Tuesday, September 10, 2024");
}
