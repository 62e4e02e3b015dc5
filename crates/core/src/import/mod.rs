//! Spreadsheet import.
//!
//! Reads `.xlsx`, `.xls`, `.ods` and `.csv` uploads, finds the header row,
//! maps columns onto canonical budget item fields and coerces cell values.
//! Row-level problems become [`ImportWarning`]s; only problems with the file
//! as a whole are [`ImportError`]s.

pub mod coerce;
pub mod columns;
mod error;
mod normalizer;
mod reader;

#[cfg(test)]
mod coerce_props;

pub use columns::{Channel, Field, MetricLabels, metric_labels};
pub use error::{ImportError, ImportWarning};
pub use normalizer::{
    NormalizedItem, NormalizedSheet, content_hash, normalize, spreadsheet_extension,
};
pub use reader::{Cell, RawSheet, read_sheet, select_sheet};
