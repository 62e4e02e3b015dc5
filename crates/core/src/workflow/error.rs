//! Workflow error types for the budget file lifecycle.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::auth::Role;
use crate::document::DocumentError;
use crate::workflow::types::{FileStatus, Transition};

/// Which precondition of a transition failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The actor's role may not perform the transition.
    RoleNotPermitted(Role),
    /// The file is not in the transition's source status.
    WrongStatus,
    /// A rejection needs a non-empty reason.
    EmptyReason,
    /// Finalization needs a stored signed scan.
    MissingSignedDocument,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoleNotPermitted(role) => write!(f, "role {role} is not permitted"),
            Self::WrongStatus => f.write_str("file is not in the required status"),
            Self::EmptyReason => f.write_str("a rejection reason is required"),
            Self::MissingSignedDocument => f.write_str("no signed document has been uploaded"),
        }
    }
}

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A transition precondition failed; the file is unchanged.
    #[error("cannot {transition} a file in status {current}: {violation} (requires {required_role} or admin)")]
    InvalidTransition {
        /// The file's status when the transition was attempted.
        current: FileStatus,
        /// The attempted transition.
        transition: Transition,
        /// The non-admin role owning the transition.
        required_role: Role,
        /// The failed precondition.
        violation: Violation,
    },

    /// Another request changed the file between read and write.
    #[error("budget file {file_id} was modified concurrently")]
    ConcurrentModification {
        /// The contested file.
        file_id: Uuid,
    },

    /// The role may not upload budget spreadsheets.
    #[error("role {0} may not upload budget files")]
    UploadNotPermitted(Role),

    /// Budget file not found.
    #[error("budget file {0} not found")]
    FileNotFound(Uuid),

    /// The file has no document of the requested kind yet.
    #[error("budget file {file_id} has no {kind} document")]
    NoDocument {
        /// The file.
        file_id: Uuid,
        /// `pdf`, `signed` or `source`.
        kind: &'static str,
    },

    /// Document store failure during a transition.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Builds an `InvalidTransition` for `transition` attempted from `current`.
    #[must_use]
    pub fn invalid(current: FileStatus, transition: Transition, violation: Violation) -> Self {
        Self::InvalidTransition {
            current,
            transition,
            required_role: transition.required_role(),
            violation,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition {
                violation: Violation::RoleNotPermitted(_),
                ..
            }
            | Self::UploadNotPermitted(_) => 403,
            Self::InvalidTransition { .. } | Self::ConcurrentModification { .. } => 409,
            Self::FileNotFound(_) | Self::NoDocument { .. } => 404,
            Self::Document(e) => e.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            Self::UploadNotPermitted(_) => "UPLOAD_NOT_PERMITTED",
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::NoDocument { .. } => "DOCUMENT_NOT_FOUND",
            Self::Document(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_status_is_conflict() {
        let err = WorkflowError::invalid(
            FileStatus::Signing,
            Transition::Approve,
            Violation::WrongStatus,
        );
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        let msg = err.to_string();
        assert!(msg.contains("approve"));
        assert!(msg.contains("signing"));
        assert!(msg.contains("manager"));
    }

    #[test]
    fn test_role_violation_is_forbidden() {
        let err = WorkflowError::invalid(
            FileStatus::PendingApproval,
            Transition::Approve,
            Violation::RoleNotPermitted(Role::Planner),
        );
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
    }

    #[test]
    fn test_concurrent_modification() {
        let err = WorkflowError::ConcurrentModification {
            file_id: Uuid::nil(),
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "CONCURRENT_MODIFICATION");
    }

    #[test]
    fn test_not_found_and_database() {
        assert_eq!(WorkflowError::FileNotFound(Uuid::nil()).status_code(), 404);
        assert_eq!(WorkflowError::Database("x".into()).status_code(), 500);
    }

    #[test]
    fn test_document_errors_delegate() {
        let err = WorkflowError::from(DocumentError::UnsupportedFileType {
            extension: "exe".into(),
        });
        assert_eq!(err.status_code(), 415);
        assert_eq!(err.error_code(), "UNSUPPORTED_FILE_TYPE");
    }
}
