//! Spreadsheet normalization into budget items.

use std::collections::HashSet;
use std::path::Path;

use bap_shared::config::ImportSettings;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::coerce::{amount_in_range, excel_serial_to_date, parse_amount, parse_date};
use super::columns::{Channel, Field, map_header};
use super::error::{ImportError, ImportWarning};
use super::reader::{Cell, RawSheet, read_sheet};

static EMPTY: Cell = Cell::Empty;

/// One budget line extracted from the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedItem {
    /// 1-based spreadsheet row.
    pub row_number: i32,
    /// Budget code.
    pub budget_code: String,
    /// Campaign name.
    pub campaign_name: String,
    /// Vendor or agency.
    pub vendor: Option<String>,
    /// Channel declared for the upload.
    pub channel: Channel,
    /// Channel-specific sub-channel.
    pub sub_channel: Option<String>,
    /// Planned amount.
    pub amount_planned: Decimal,
    /// Start date.
    pub start_date: Option<NaiveDate>,
    /// End date.
    pub end_date: Option<NaiveDate>,
    /// Channel metric 1, as written.
    pub metric_1: Option<String>,
    /// Channel metric 2, as written.
    pub metric_2: Option<String>,
    /// Channel metric 3, as written.
    pub metric_3: Option<String>,
    /// Explicit column value, else the uploader's username.
    pub specialist: String,
    /// Free-text description.
    pub description: Option<String>,
}

/// Result of a successful normalization.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedSheet {
    /// Items in spreadsheet order.
    pub items: Vec<NormalizedItem>,
    /// Recoverable problems, in the order found.
    pub warnings: Vec<ImportWarning>,
    /// 1-based spreadsheet row of the detected header.
    pub header_row: usize,
    /// Imported sheet; `None` for CSV.
    pub sheet_name: Option<String>,
    /// Number of items.
    pub row_count: usize,
    /// Sum of item amounts.
    pub total_amount: Decimal,
    /// Hex SHA-256 of the uploaded bytes.
    pub content_hash: String,
}

/// Header columns mapped to fields, first occurrence wins.
#[derive(Debug)]
struct HeaderMap {
    index: usize,
    columns: Vec<(usize, Field)>,
}

impl HeaderMap {
    fn column(&self, field: Field) -> Option<usize> {
        self.columns
            .iter()
            .find(|(_, f)| *f == field)
            .map(|(col, _)| *col)
    }

    fn missing_required(&self) -> Vec<Field> {
        Field::REQUIRED
            .into_iter()
            .filter(|f| self.column(*f).is_none())
            .collect()
    }
}

/// Parse an uploaded spreadsheet into normalized items.
///
/// The format is taken from the extension of `filename`. `uploader` is the
/// specialist for rows without an explicit specialist column.
///
/// # Errors
///
/// Returns [`ImportError`] when the file cannot be read, has no recognizable
/// header, lacks a required column or yields no valid rows.
pub fn normalize(
    bytes: &[u8],
    filename: &str,
    channel: Channel,
    uploader: &str,
    settings: &ImportSettings,
) -> Result<NormalizedSheet, ImportError> {
    let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    if size > settings.max_upload_bytes {
        return Err(ImportError::FileTooLarge {
            size,
            max: settings.max_upload_bytes,
        });
    }
    if bytes.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    let extension = spreadsheet_extension(filename);
    let sheet = read_sheet(bytes, &extension)?;
    let content_hash = content_hash(bytes);

    let mut warnings = Vec::new();
    let header = detect_header(&sheet, channel, settings, &mut warnings)?;

    let missing = header.missing_required();
    if !missing.is_empty() {
        return Err(ImportError::MissingRequiredColumns { missing });
    }

    let mut items = Vec::new();
    let mut skipped = 0usize;
    for (offset, row) in sheet.rows.iter().enumerate().skip(header.index + 1) {
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        let row_number = sheet.first_row + offset + 1;
        match build_item(row, row_number, &header, channel, uploader, &mut warnings) {
            Some(item) => items.push(item),
            None => skipped += 1,
        }
    }

    if items.is_empty() {
        return Err(ImportError::NoValidRows { skipped });
    }

    let total_amount = items
        .iter()
        .try_fold(Decimal::ZERO, |sum, i| sum.checked_add(i.amount_planned))
        .ok_or(ImportError::TotalOutOfRange { rows: items.len() })?;
    Ok(NormalizedSheet {
        row_count: items.len(),
        items,
        warnings,
        header_row: sheet.first_row + header.index + 1,
        sheet_name: sheet.sheet_name,
        total_amount,
        content_hash,
    })
}

/// Hex SHA-256 of `bytes`, used for duplicate detection.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Lower-cased extension of `filename`, empty when it has none.
#[must_use]
pub fn spreadsheet_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

fn detect_header(
    sheet: &RawSheet,
    channel: Channel,
    settings: &ImportSettings,
    warnings: &mut Vec<ImportWarning>,
) -> Result<HeaderMap, ImportError> {
    let scanned = sheet.rows.len().min(settings.header_scan_rows);

    let mut best: Option<HeaderMap> = None;
    for (index, row) in sheet.rows.iter().take(scanned).enumerate() {
        let candidate = map_row(index, row, channel);
        if best
            .as_ref()
            .is_none_or(|b| candidate.columns.len() > b.columns.len())
        {
            best = Some(candidate);
        }
    }

    let header = best
        .filter(|b| b.columns.len() >= settings.min_header_matches.max(1))
        .ok_or(ImportError::HeaderNotFound { scanned })?;

    let row = &sheet.rows[header.index];
    for (col, cell) in row.iter().enumerate() {
        let Some(text) = cell.as_text() else { continue };
        if let Some(field) = map_header(&text, channel)
            && header.column(field).is_some_and(|kept| kept != col)
        {
            warnings.push(ImportWarning::file(format!(
                "column '{text}' ignored: {field} already mapped"
            )));
        }
    }

    Ok(header)
}

fn map_row(index: usize, row: &[Cell], channel: Channel) -> HeaderMap {
    let mut seen = HashSet::new();
    let columns = row
        .iter()
        .enumerate()
        .filter_map(|(col, cell)| {
            let field = map_header(&cell.as_text()?, channel)?;
            seen.insert(field).then_some((col, field))
        })
        .collect();
    HeaderMap { index, columns }
}

fn build_item(
    row: &[Cell],
    row_number: usize,
    header: &HeaderMap,
    channel: Channel,
    uploader: &str,
    warnings: &mut Vec<ImportWarning>,
) -> Option<NormalizedItem> {
    let cell = |field: Field| {
        header
            .column(field)
            .and_then(|col| row.get(col))
            .unwrap_or(&EMPTY)
    };
    let text = |field: Field| cell(field).as_text();

    for field in Field::REQUIRED {
        if cell(field).is_empty() {
            warnings.push(ImportWarning::row(row_number, format!("missing {field}; row skipped")));
            return None;
        }
    }

    let amount_cell = cell(Field::AmountPlanned);
    let Some(amount_planned) = amount(amount_cell) else {
        let shown = amount_cell.as_text().unwrap_or_default();
        warnings.push(ImportWarning::row(
            row_number,
            format!("invalid amount '{shown}'; row skipped"),
        ));
        return None;
    };
    if !amount_in_range(amount_planned) {
        warnings.push(ImportWarning::row(row_number, "amount out of range; row skipped"));
        return None;
    }

    let Ok(row_number_i32) = i32::try_from(row_number) else {
        warnings.push(ImportWarning::row(row_number, "row number out of range; row skipped"));
        return None;
    };

    let mut optional_date = |field: Field| {
        let c = cell(field);
        if c.is_empty() {
            return None;
        }
        let parsed = date(c);
        if parsed.is_none() {
            let shown = c.as_text().unwrap_or_default();
            warnings.push(ImportWarning::row(
                row_number,
                format!("invalid {field} '{shown}'; left empty"),
            ));
        }
        parsed
    };
    let start_date = optional_date(Field::StartDate);
    let end_date = optional_date(Field::EndDate);

    if let (Some(start), Some(end)) = (start_date, end_date)
        && end < start
    {
        warnings.push(ImportWarning::row(row_number, "end_date is before start_date"));
    }

    Some(NormalizedItem {
        row_number: row_number_i32,
        budget_code: text(Field::BudgetCode).unwrap_or_default(),
        campaign_name: text(Field::CampaignName).unwrap_or_default(),
        vendor: text(Field::Vendor),
        channel,
        sub_channel: text(Field::SubChannel),
        amount_planned,
        start_date,
        end_date,
        metric_1: text(Field::Metric1),
        metric_2: text(Field::Metric2),
        metric_3: text(Field::Metric3),
        specialist: text(Field::Specialist).unwrap_or_else(|| uploader.to_string()),
        description: text(Field::Description),
    })
}

fn amount(cell: &Cell) -> Option<Decimal> {
    match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => parse_amount(s),
        Cell::Empty | Cell::Date(_) => None,
    }
}

fn date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => parse_date(s),
        Cell::Number(n) if n.fract().is_zero() => n.to_u64().and_then(excel_serial_to_date),
        Cell::Number(_) | Cell::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn settings() -> ImportSettings {
        ImportSettings::default()
    }

    fn run(csv: &str, channel: Channel) -> Result<NormalizedSheet, ImportError> {
        normalize(csv.as_bytes(), "budget.csv", channel, "planner1", &settings())
    }

    #[test]
    fn test_header_below_preamble() {
        let csv = "\
Marketing budget 2024,,,
Prepared by finance,,,
,,,
Budget Code,Campaign Name,Vendor,Amount
TV-001,Spring launch,MNB,\"1,500,000\"
TV-002,Summer promo,,\"1.500.000,50\"
";
        let sheet = run(csv, Channel::Tv).unwrap();

        assert_eq!(sheet.header_row, 4);
        assert_eq!(sheet.row_count, 2);
        assert_eq!(sheet.items[0].row_number, 5);
        assert_eq!(sheet.items[0].budget_code, "TV-001");
        assert_eq!(sheet.items[0].vendor.as_deref(), Some("MNB"));
        assert_eq!(sheet.items[1].vendor, None);
        assert_eq!(sheet.items[1].amount_planned, dec!(1500000.50));
        assert_eq!(sheet.total_amount, dec!(3000000.50));
        assert!(sheet.warnings.is_empty());
    }

    #[test]
    fn test_mongolian_headers_and_channel_metrics() {
        let csv = "\
Төсвийн код,Кампанит ажил,Дүн,Суваг,Duration,GRP,Хариуцагч
TV-9,Шинэ жил,₮ 2 000,MNB,30,12.5,bat
";
        let sheet = run(csv, Channel::Tv).unwrap();
        let item = &sheet.items[0];

        assert_eq!(item.amount_planned, dec!(2000));
        assert_eq!(item.sub_channel.as_deref(), Some("MNB"));
        assert_eq!(item.metric_1.as_deref(), Some("30"));
        assert_eq!(item.metric_3.as_deref(), Some("12.5"));
        assert_eq!(item.specialist, "bat");
        assert_eq!(item.channel, Channel::Tv);
    }

    #[test]
    fn test_specialist_defaults_to_uploader() {
        let csv = "code,campaign,amount,specialist\nA,B,10,\nC,D,20,dorj\n";
        let sheet = run(csv, Channel::Other).unwrap();
        assert_eq!(sheet.items[0].specialist, "planner1");
        assert_eq!(sheet.items[1].specialist, "dorj");
    }

    #[test]
    fn test_missing_required_columns_named() {
        let csv = "campaign,vendor,start date\nA,B,2024-01-01\n";
        let err = run(csv, Channel::Tv).unwrap_err();
        match err {
            ImportError::MissingRequiredColumns { missing } => {
                assert_eq!(missing, vec![Field::BudgetCode, Field::AmountPlanned]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_header_not_found() {
        let csv = "hello,world\n1,2\n3,4\n";
        assert!(matches!(
            run(csv, Channel::Tv),
            Err(ImportError::HeaderNotFound { scanned: 3 })
        ));
    }

    #[test]
    fn test_header_outside_scan_window() {
        let mut csv = String::new();
        for i in 0..12 {
            csv.push_str(&format!("note {i},\n"));
        }
        csv.push_str("budget code,campaign,amount\nX,Y,1\n");
        assert!(matches!(
            run(&csv, Channel::Tv),
            Err(ImportError::HeaderNotFound { scanned: 10 })
        ));
    }

    #[test]
    fn test_row_level_warnings() {
        let csv = "\
budget code,campaign,amount,start date,end date
A-1,Kept,100,2024-01-01,not a date
,No code,200,,
A-3,Bad amount,lots,,
,,,,
A-5,Also kept,(50),15.03.2024,2024-03-01
";
        let sheet = run(csv, Channel::Digital).unwrap();

        assert_eq!(sheet.row_count, 2);
        assert_eq!(sheet.items[0].end_date, None);
        assert_eq!(sheet.items[1].row_number, 6);
        assert_eq!(sheet.items[1].amount_planned, dec!(-50));
        assert_eq!(sheet.total_amount, dec!(50));

        let rows: Vec<Option<usize>> = sheet.warnings.iter().map(|w| w.row).collect();
        assert_eq!(rows, vec![Some(2), Some(3), Some(4), Some(6)]);
        assert!(sheet.warnings[0].message.contains("end_date"));
        assert!(sheet.warnings[1].message.contains("budget_code"));
        assert!(sheet.warnings[2].message.contains("lots"));
        assert!(sheet.warnings[3].message.contains("before"));
    }

    #[test]
    fn test_oversized_amounts_skipped() {
        let csv = "\
budget code,campaign,amount
A,Max,79228162514264337593543950335
B,Max again,79228162514264337593543950335
C,Edge,9999999999999999.99
D,Kept,100
";
        let sheet = run(csv, Channel::Tv).unwrap();

        assert_eq!(sheet.row_count, 2);
        assert_eq!(sheet.items[0].budget_code, "C");
        assert_eq!(sheet.total_amount, dec!(10000000000000099.99));
        let rows: Vec<Option<usize>> = sheet.warnings.iter().map(|w| w.row).collect();
        assert_eq!(rows, vec![Some(2), Some(3)]);
        assert!(sheet.warnings[0].message.contains("out of range"));
    }

    #[test]
    fn test_only_oversized_amounts_is_no_valid_rows() {
        let csv = "budget code,campaign,amount\nA,B,79228162514264337593543950335\n";
        assert!(matches!(
            run(csv, Channel::Tv),
            Err(ImportError::NoValidRows { skipped: 1 })
        ));
    }

    #[test]
    fn test_no_valid_rows() {
        let csv = "budget code,campaign,amount\nA,,1\n,B,2\n";
        assert!(matches!(
            run(csv, Channel::Tv),
            Err(ImportError::NoValidRows { skipped: 2 })
        ));
    }

    #[test]
    fn test_duplicate_header_first_wins() {
        let csv = "budget code,campaign,amount,total\nA,B,10,999\n";
        let sheet = run(csv, Channel::Other).unwrap();
        assert_eq!(sheet.items[0].amount_planned, dec!(10));
        assert_eq!(sheet.warnings.len(), 1);
        assert!(sheet.warnings[0].message.contains("total"));
    }

    #[test]
    fn test_size_and_format_checks() {
        let tight = ImportSettings {
            max_upload_bytes: 4,
            ..ImportSettings::default()
        };
        assert!(matches!(
            normalize(b"12345", "a.csv", Channel::Tv, "u", &tight),
            Err(ImportError::FileTooLarge { size: 5, max: 4 })
        ));
        assert!(matches!(
            normalize(b"", "a.csv", Channel::Tv, "u", &settings()),
            Err(ImportError::EmptyFile)
        ));
        assert!(matches!(
            normalize(b"data", "a.pdf", Channel::Tv, "u", &settings()),
            Err(ImportError::UnsupportedFormat { extension }) if extension == "pdf"
        ));
    }

    #[test]
    fn test_content_hash_is_stable_hex() {
        let a = content_hash(b"same bytes");
        assert_eq!(a, content_hash(b"same bytes"));
        assert_ne!(a, content_hash(b"other bytes"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert_eq!(spreadsheet_extension("Budget.XLSX"), "xlsx");
        assert_eq!(spreadsheet_extension("noext"), "");
    }

    #[test]
    fn test_number_cells_as_dates() {
        assert_eq!(
            date(&Cell::Number(dec!(45366))),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(date(&Cell::Number(dec!(45366.5))), None);
    }
}
