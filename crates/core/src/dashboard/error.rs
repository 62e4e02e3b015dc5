//! Dashboard edit errors.

use thiserror::Error;
use uuid::Uuid;

/// Reasons an edited row is rejected.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The actor is not the row's specialist.
    #[error("item {row_id} belongs to specialist '{specialist}'")]
    UnauthorizedEdit {
        /// Edited row.
        row_id: Uuid,
        /// Owning specialist.
        specialist: String,
    },

    /// No item with this ID.
    #[error("item {0} not found")]
    ItemNotFound(Uuid),

    /// Parent file is not finalized.
    #[error("item {row_id} is not in a finalized file")]
    NotFinalized {
        /// Edited row.
        row_id: Uuid,
    },

    /// Value does not fit the field.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// Field name as sent.
        field: String,
        /// What was wrong.
        message: String,
    },

    /// An aggregate does not fit a decimal.
    #[error("total for {0} is out of range")]
    TotalOutOfRange(String),

    /// Storage failure.
    #[error("database error: {0}")]
    Database(String),
}

impl DashboardError {
    /// Shorthand for [`DashboardError::InvalidValue`].
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::UnauthorizedEdit { .. } => 403,
            Self::ItemNotFound(_) => 404,
            Self::NotFinalized { .. } => 409,
            Self::InvalidValue { .. } => 422,
            Self::TotalOutOfRange(_) | Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnauthorizedEdit { .. } => "UNAUTHORIZED_EDIT",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::NotFinalized { .. } => "NOT_FINALIZED",
            Self::InvalidValue { .. } => "INVALID_VALUE",
            Self::TotalOutOfRange(_) => "TOTAL_OUT_OF_RANGE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
