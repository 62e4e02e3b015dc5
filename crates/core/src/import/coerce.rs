//! Cell value coercion for amounts and dates.

use std::str::FromStr;

use chrono::{Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Date formats tried in order; the first that parses wins.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%d.%m.%Y", "%m/%d/%Y", "%d/%m/%Y",
];

/// Date-time formats tried after [`DATE_FORMATS`]; the time part is dropped.
pub const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Largest serial Excel accepts (9999-12-31).
const MAX_EXCEL_SERIAL: u64 = 2_958_465;

/// Exclusive bound on stored amounts; `decimal(18,2)` keeps 16 integer digits.
const AMOUNT_LIMIT: i64 = 10_000_000_000_000_000;

/// True when `amount` fits the amount column.
#[must_use]
pub fn amount_in_range(amount: Decimal) -> bool {
    amount.abs() < Decimal::from(AMOUNT_LIMIT)
}

/// Parse a locale-tolerant amount.
///
/// Accepts currency symbols (`₮ $ €`), any Unicode whitespace (including
/// NBSP) and apostrophes as grouping, `.` or `,` as either the thousands or
/// decimal separator, a leading minus, and accounting-style parentheses.
///
/// Returns `None` for anything that is not a number once those are removed.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut s: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '₮' | '$' | '€' | '\''))
        .collect();

    let mut negative = false;
    if s.starts_with('(') && s.ends_with(')') && s.len() > 2 {
        negative = true;
        s = s[1..s.len() - 1].to_string();
    }
    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest.to_string();
    }

    if s.is_empty() || !s.starts_with(|c: char| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let normalized = normalize_separators(&s)?;
    let value = if normalized.contains(['e', 'E']) {
        Decimal::from_scientific(&normalized).ok()?
    } else {
        Decimal::from_str(&normalized).ok()?
    };

    Some(if negative { -value } else { value })
}

/// Rewrite `s` so that `.` is the only (optional) decimal separator.
fn normalize_separators(s: &str) -> Option<String> {
    let dots = s.matches('.').count();
    let commas = s.matches(',').count();

    let (decimal, grouping) = match (dots, commas) {
        (0, 0) => return Some(s.to_string()),
        // Both present: whichever comes last is the decimal separator.
        (_, _) if dots > 0 && commas > 0 => {
            let last_dot = s.rfind('.')?;
            let last_comma = s.rfind(',')?;
            if last_dot > last_comma {
                (Some('.'), ',')
            } else {
                (Some(','), '.')
            }
        }
        (1, 0) => (Some('.'), ','),
        (_, 0) => (None, '.'),
        (0, 1) => {
            let digits_after = s.len() - s.rfind(',')? - 1;
            if digits_after == 3 {
                (None, ',')
            } else {
                (Some(','), '.')
            }
        }
        (_, _) => (None, ','),
    };

    if let Some(d) = decimal
        && s.matches(d).count() > 1
    {
        return None;
    }

    let out: String = s
        .chars()
        .filter(|c| *c != grouping)
        .map(|c| if Some(c) == decimal { '.' } else { c })
        .collect();
    Some(out)
}

/// Parse a date through [`DATE_FORMATS`], then [`DATETIME_FORMATS`], then
/// as an Excel serial day number.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            let serial = s.strip_suffix(".0").unwrap_or(s);
            if serial.len() <= 7 && serial.chars().all(|c| c.is_ascii_digit()) {
                serial.parse().ok().and_then(excel_serial_to_date)
            } else {
                None
            }
        })
}

/// Convert an Excel 1900-system serial day number to a date.
///
/// Serials below 60 count from 1899-12-31; later ones count from 1899-12-30,
/// absorbing Excel's phantom 1900-02-29.
#[must_use]
pub fn excel_serial_to_date(serial: u64) -> Option<NaiveDate> {
    if serial == 0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = if serial < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_days(Days::new(serial))
}
