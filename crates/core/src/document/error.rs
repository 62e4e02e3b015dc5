//! Document store error types.

use thiserror::Error;

/// Document store errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Signed scan with an extension outside the allow-list.
    #[error("file type '.{extension}' is not accepted; use .pdf, .jpg, .jpeg or .png")]
    UnsupportedFileType {
        /// The rejected extension, normalized.
        extension: String,
    },

    /// Document exceeds the configured size limit.
    #[error("document size {size} bytes exceeds maximum allowed {max} bytes")]
    DocumentTooLarge {
        /// Actual size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// A stored path points at bytes that no longer exist.
    #[error("stored document is missing: {path}")]
    OrphanedReference {
        /// The dangling relative path.
        path: String,
    },

    /// Store could not be initialized.
    #[error("document store configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("document store operation failed: {0}")]
    Operation(String),
}

impl DocumentError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::UnsupportedFileType { .. } => 415,
            Self::DocumentTooLarge { .. } => 413,
            Self::OrphanedReference { .. } | Self::Configuration(_) | Self::Operation(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFileType { .. } => "UNSUPPORTED_FILE_TYPE",
            Self::DocumentTooLarge { .. } => "DOCUMENT_TOO_LARGE",
            Self::OrphanedReference { .. } => "ORPHANED_REFERENCE",
            Self::Configuration(_) => "STORAGE_CONFIGURATION_ERROR",
            Self::Operation(_) => "STORAGE_ERROR",
        }
    }

    /// Maps an OpenDAL error raised while touching `path`.
    pub(crate) fn from_opendal(path: &str, err: &opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::OrphanedReference {
                path: path.to_string(),
            },
            _ => Self::Operation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            DocumentError::UnsupportedFileType {
                extension: "exe".into()
            }
            .status_code(),
            415
        );
        assert_eq!(
            DocumentError::OrphanedReference {
                path: "signed/x".into()
            }
            .status_code(),
            500
        );
        assert_eq!(
            DocumentError::DocumentTooLarge { size: 2, max: 1 }.error_code(),
            "DOCUMENT_TOO_LARGE"
        );
    }

    #[test]
    fn test_not_found_maps_to_orphaned_reference() {
        let err = opendal::Error::new(opendal::ErrorKind::NotFound, "gone");
        assert!(matches!(
            DocumentError::from_opendal("pdf/a/b.pdf", &err),
            DocumentError::OrphanedReference { path } if path == "pdf/a/b.pdf"
        ));

        let err = opendal::Error::new(opendal::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            DocumentError::from_opendal("pdf/a/b.pdf", &err),
            DocumentError::Operation(_)
        ));
    }
}
