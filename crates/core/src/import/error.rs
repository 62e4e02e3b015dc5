//! Spreadsheet import error types.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::columns::Field;

/// Errors that stop an import. Row-level problems are [`ImportWarning`]s.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Upload exceeds the configured size limit.
    #[error("file size {size} bytes exceeds maximum allowed {max} bytes")]
    FileTooLarge {
        /// Actual size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Upload has no content.
    #[error("uploaded file is empty")]
    EmptyFile,

    /// Extension is not a supported spreadsheet format.
    #[error("unsupported spreadsheet format '{extension}'; use .xlsx, .xls, .ods or .csv")]
    UnsupportedFormat {
        /// The rejected extension.
        extension: String,
    },

    /// The file could not be parsed as the declared format.
    #[error("could not read spreadsheet: {0}")]
    Unreadable(String),

    /// The workbook has no sheets.
    #[error("workbook contains no sheets")]
    EmptyWorkbook,

    /// No row within the scan window looked like a header.
    #[error("no header row found in the first {scanned} rows")]
    HeaderNotFound {
        /// Rows examined.
        scanned: usize,
    },

    /// The header lacks required columns.
    #[error("missing required columns: {}", join_fields(.missing))]
    MissingRequiredColumns {
        /// Required fields with no matching header.
        missing: Vec<Field>,
    },

    /// The item amounts do not sum to a representable total.
    #[error("total amount of {rows} rows is out of range")]
    TotalOutOfRange {
        /// Rows summed.
        rows: usize,
    },

    /// Every data row was skipped.
    #[error("no valid rows found ({skipped} rows skipped)")]
    NoValidRows {
        /// Rows skipped with a warning.
        skipped: usize,
    },
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ImportError {
    /// True for content problems (422) as opposed to unreadable input (400).
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredColumns { .. }
                | Self::NoValidRows { .. }
                | Self::TotalOutOfRange { .. }
        )
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::FileTooLarge { .. } => 413,
            Self::MissingRequiredColumns { .. }
            | Self::NoValidRows { .. }
            | Self::TotalOutOfRange { .. } => 422,
            Self::EmptyFile
            | Self::UnsupportedFormat { .. }
            | Self::Unreadable(_)
            | Self::EmptyWorkbook
            | Self::HeaderNotFound { .. } => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::EmptyFile => "EMPTY_FILE",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::Unreadable(_) => "UNREADABLE_FILE",
            Self::EmptyWorkbook => "EMPTY_WORKBOOK",
            Self::HeaderNotFound { .. } => "HEADER_NOT_FOUND",
            Self::MissingRequiredColumns { .. } => "MISSING_REQUIRED_COLUMNS",
            Self::NoValidRows { .. } => "NO_VALID_ROWS",
            Self::TotalOutOfRange { .. } => "TOTAL_OUT_OF_RANGE",
        }
    }
}

/// A recoverable problem reported back to the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportWarning {
    /// 1-based spreadsheet row, when the warning concerns one row.
    pub row: Option<usize>,
    /// Human-readable message.
    pub message: String,
}

impl ImportWarning {
    /// Warning about a specific row.
    #[must_use]
    pub fn row(row: usize, message: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            message: message.into(),
        }
    }

    /// Warning about the whole file.
    #[must_use]
    pub fn file(message: impl Into<String>) -> Self {
        Self {
            row: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "row {row}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_names_fields() {
        let err = ImportError::MissingRequiredColumns {
            missing: vec![Field::BudgetCode, Field::AmountPlanned],
        };
        assert_eq!(
            err.to_string(),
            "missing required columns: budget_code, amount_planned"
        );
        assert!(err.is_validation());
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_parse_errors_are_bad_request() {
        assert_eq!(ImportError::HeaderNotFound { scanned: 10 }.status_code(), 400);
        assert!(!ImportError::EmptyWorkbook.is_validation());
        assert_eq!(
            ImportError::UnsupportedFormat {
                extension: "txt".into()
            }
            .error_code(),
            "UNSUPPORTED_FORMAT"
        );
    }

    #[test]
    fn test_warning_display() {
        assert_eq!(
            ImportWarning::row(7, "missing budget_code").to_string(),
            "row 7: missing budget_code"
        );
        assert_eq!(
            ImportWarning::file("duplicate upload").to_string(),
            "duplicate upload"
        );
    }
}
