//! Raw grid extraction from workbook and CSV bytes.

use std::fmt::Display;
use std::io::Cursor;

use calamine::{Data, Ods, Reader, Xls, Xlsx};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::ImportError;

const PREFERRED_SHEET_WORDS: &[&str] = &["template", "гүйцэтгэл"];
const EXCLUDED_SHEET_WORDS: &[&str] = &["general", "employee", "target"];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One typed spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Blank cell.
    Empty,
    /// Text, trimmed and non-empty.
    Text(String),
    /// Numeric cell.
    Number(Decimal),
    /// Native date cell.
    Date(NaiveDate),
}

impl Cell {
    /// Build a text cell; whitespace-only text is `Empty`.
    #[must_use]
    pub fn text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::Empty
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    /// True for a blank cell.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The cell rendered as text, `None` if blank.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => Some(n.normalize().to_string()),
            Self::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// The selected sheet as a grid of cells.
#[derive(Debug, Clone)]
pub struct RawSheet {
    /// Sheet name; `None` for CSV.
    pub sheet_name: Option<String>,
    /// 0-based spreadsheet row of `rows[0]`.
    pub first_row: usize,
    /// Cell rows, top to bottom.
    pub rows: Vec<Vec<Cell>>,
}

/// Read the relevant sheet from `bytes` according to `extension`.
pub fn read_sheet(bytes: &[u8], extension: &str) -> Result<RawSheet, ImportError> {
    match extension {
        "csv" => read_csv(bytes),
        "xlsx" | "xlsm" => read_workbook(Xlsx::new(Cursor::new(bytes))),
        "xls" => read_workbook(Xls::new(Cursor::new(bytes))),
        "ods" => read_workbook(Ods::new(Cursor::new(bytes))),
        other => Err(ImportError::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}

/// Pick the sheet to import.
///
/// First sheet whose name contains a preferred word and no excluded word,
/// else the first sheet without an excluded word, else the first sheet.
#[must_use]
pub fn select_sheet(names: &[String]) -> Option<&String> {
    let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    let excluded = |name: &str| EXCLUDED_SHEET_WORDS.iter().any(|w| name.contains(w));
    let preferred = |name: &str| PREFERRED_SHEET_WORDS.iter().any(|w| name.contains(w));

    lowered
        .iter()
        .position(|n| preferred(n) && !excluded(n))
        .or_else(|| lowered.iter().position(|n| !excluded(n)))
        .and_then(|i| names.get(i))
        .or_else(|| names.first())
}

fn read_workbook<'a, R>(opened: Result<R, R::Error>) -> Result<RawSheet, ImportError>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: Display,
{
    let mut workbook = opened.map_err(|e| ImportError::Unreadable(e.to_string()))?;

    let names = workbook.sheet_names();
    let name = select_sheet(&names)
        .cloned()
        .ok_or(ImportError::EmptyWorkbook)?;

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| ImportError::Unreadable(e.to_string()))?;

    let first_row = range
        .start()
        .and_then(|(row, _)| usize::try_from(row).ok())
        .unwrap_or(0);
    let rows = range
        .rows()
        .map(|row| row.iter().map(convert).collect())
        .collect();

    Ok(RawSheet {
        sheet_name: Some(name),
        first_row,
        rows,
    })
}

fn convert(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s),
        Data::Int(i) => Cell::Number(Decimal::from(*i)),
        Data::Float(f) => Decimal::try_from(*f).map_or(Cell::Empty, |d| Cell::Number(d.normalize())),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or(Cell::Empty, |value| Cell::Date(value.date())),
    }
}

fn read_csv(bytes: &[u8]) -> Result<RawSheet, ImportError> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::Unreadable(e.to_string()))?;
        rows.push(record.iter().map(Cell::text).collect());
    }

    Ok(RawSheet {
        sheet_name: None,
        first_row: 0,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_select_prefers_template() {
        let sheets = names(&["General", "TV Template", "Notes"]);
        assert_eq!(select_sheet(&sheets).map(String::as_str), Some("TV Template"));
    }

    #[test]
    fn test_select_mongolian_keyword() {
        let sheets = names(&["Sheet1", "3-р сарын гүйцэтгэл"]);
        assert_eq!(
            select_sheet(&sheets).map(String::as_str),
            Some("3-р сарын гүйцэтгэл")
        );
    }

    #[test]
    fn test_select_skips_excluded_template() {
        let sheets = names(&["Employee template", "Data"]);
        assert_eq!(select_sheet(&sheets).map(String::as_str), Some("Data"));
    }

    #[test]
    fn test_select_falls_back_to_first() {
        let sheets = names(&["General", "Target"]);
        assert_eq!(select_sheet(&sheets).map(String::as_str), Some("General"));
        assert_eq!(select_sheet(&[]), None);
    }

    #[test]
    fn test_csv_strips_bom_and_allows_ragged_rows() {
        let bytes = b"\xEF\xBB\xBFBudget Code,Campaign,Amount\nTV-1,Spring, 1500 \nshort\n";
        let sheet = read_sheet(bytes, "csv").unwrap();

        assert_eq!(sheet.sheet_name, None);
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[0][0], Cell::Text("Budget Code".into()));
        assert_eq!(sheet.rows[1][2], Cell::Text("1500".into()));
        assert_eq!(sheet.rows[2].len(), 1);
    }

    #[test]
    fn test_unknown_extension() {
        assert!(matches!(
            read_sheet(b"whatever", "txt"),
            Err(ImportError::UnsupportedFormat { extension }) if extension == "txt"
        ));
    }

    #[test]
    fn test_garbage_workbook_is_unreadable() {
        assert!(matches!(
            read_sheet(b"not a zip archive", "xlsx"),
            Err(ImportError::Unreadable(_))
        ));
    }

    #[test]
    fn test_cell_text_rendering() {
        assert_eq!(Cell::text("   "), Cell::Empty);
        assert_eq!(Cell::Number(dec!(1001.00)).as_text(), Some("1001".into()));
        assert_eq!(
            Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()).as_text(),
            Some("2024-01-02".into())
        );
        assert_eq!(Cell::Empty.as_text(), None);
    }

    #[test]
    fn test_convert_calamine_cells() {
        assert_eq!(convert(&Data::Int(42)), Cell::Number(dec!(42)));
        assert_eq!(convert(&Data::Float(12.5)), Cell::Number(dec!(12.5)));
        assert_eq!(convert(&Data::String("  x ".into())), Cell::Text("x".into()));
        assert_eq!(convert(&Data::Empty), Cell::Empty);
    }
}
