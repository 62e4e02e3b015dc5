//! Application-wide error types.
//!
//! Domain modules carry their own error enums; each maps into an [`AppError`]
//! at the HTTP boundary so every response shares one `{error, message}` shape.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role or ownership does not allow the action.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input (unreadable spreadsheet, bad request body).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Input was well-formed but cannot be accepted.
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// The resource is not in a state that allows the action.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Uploaded document type is not accepted.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Unprocessable(_) => 422,
            Self::Conflict(_) => 409,
            Self::UnsupportedMediaType(_) => 415,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unprocessable(_) => "UNPROCESSABLE",
            Self::Conflict(_) => "CONFLICT",
            Self::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthorized(String::new()), 401, "UNAUTHORIZED")]
    #[case(AppError::Forbidden(String::new()), 403, "FORBIDDEN")]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::Unprocessable(String::new()), 422, "UNPROCESSABLE")]
    #[case(AppError::Conflict(String::new()), 409, "CONFLICT")]
    #[case(
        AppError::UnsupportedMediaType(String::new()),
        415,
        "UNSUPPORTED_MEDIA_TYPE"
    )]
    #[case(AppError::Database(String::new()), 500, "DATABASE_ERROR")]
    #[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    fn test_status_and_code(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Conflict("file is SIGNING".into()).to_string(),
            "Conflict: file is SIGNING"
        );
        assert_eq!(
            AppError::UnsupportedMediaType(".exe".into()).to_string(),
            "Unsupported media type: .exe"
        );
    }
}
