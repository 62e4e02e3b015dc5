//! JSON error responses.
//!
//! Every failure leaves the API as `{ "error": CODE, "message": text }`
//! with the status the originating domain error reports.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bap_core::dashboard::DashboardError;
use bap_core::document::DocumentError;
use bap_core::import::ImportError;
use bap_core::workflow::WorkflowError;
use bap_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn new(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            message: message.into(),
        }
    }

    /// 400 for a malformed request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::Validation(message.into()).into()
    }

    /// 403 for an action the actor's role does not allow.
    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into()).into()
    }

    /// 404 for a missing resource.
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        if err.status_code() >= 500 {
            tracing::error!(error = %err, "request failed");
        }
        Self::new(err.status_code(), err.error_code(), err.to_string())
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        tracing::error!(error = %err, "database error");
        Self::new(500, "DATABASE_ERROR", "A database error occurred")
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        Self::new(err.status_code(), err.error_code(), err.to_string())
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match &err {
            DocumentError::OrphanedReference { path } => {
                tracing::error!(path = %path, "database references a missing document");
            }
            DocumentError::Configuration(_) | DocumentError::Operation(_) => {
                tracing::error!(error = %err, "document store failure");
            }
            DocumentError::UnsupportedFileType { .. } | DocumentError::DocumentTooLarge { .. } => {}
        }
        Self::new(err.status_code(), err.error_code(), err.to_string())
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Document(doc) => doc.into(),
            WorkflowError::Database(ref e) => {
                tracing::error!(error = %e, "database error during transition");
                Self::new(500, err.error_code(), "A database error occurred")
            }
            other => Self::new(other.status_code(), other.error_code(), other.to_string()),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        if let DashboardError::Database(ref e) = err {
            tracing::error!(error = %e, "database error on dashboard");
            return Self::new(500, err.error_code(), "A database error occurred");
        }
        if err.status_code() >= 500 {
            tracing::error!(error = %err, "dashboard aggregate failed");
        }
        Self::new(err.status_code(), err.error_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bap_core::auth::Role;
    use bap_core::workflow::{FileStatus, Transition, Violation};
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    #[case(
        WorkflowError::invalid(FileStatus::Signing, Transition::Approve, Violation::WrongStatus),
        StatusCode::CONFLICT,
        "INVALID_TRANSITION"
    )]
    #[case(
        WorkflowError::invalid(
            FileStatus::PendingApproval,
            Transition::Approve,
            Violation::RoleNotPermitted(Role::Planner)
        ),
        StatusCode::FORBIDDEN,
        "INVALID_TRANSITION"
    )]
    #[case(
        WorkflowError::Document(DocumentError::UnsupportedFileType { extension: "exe".into() }),
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
        "UNSUPPORTED_FILE_TYPE"
    )]
    #[case(
        WorkflowError::Document(DocumentError::OrphanedReference { path: "pdf/x.pdf".into() }),
        StatusCode::INTERNAL_SERVER_ERROR,
        "ORPHANED_REFERENCE"
    )]
    #[case(
        WorkflowError::FileNotFound(Uuid::nil()),
        StatusCode::NOT_FOUND,
        "FILE_NOT_FOUND"
    )]
    fn test_workflow_errors(
        #[case] err: WorkflowError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let api = ApiError::from(err);
        assert_eq!(api.status, status);
        assert_eq!(api.code, code);
    }

    #[test]
    fn test_database_details_are_hidden() {
        let api = ApiError::from(WorkflowError::Database("connection reset".into()));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("connection reset"));
    }

    #[test]
    fn test_import_and_dashboard_errors() {
        let api = ApiError::from(ImportError::EmptyFile);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.code, "EMPTY_FILE");

        let api = ApiError::from(DashboardError::UnauthorizedEdit {
            row_id: Uuid::nil(),
            specialist: "dorj".into(),
        });
        assert_eq!(api.status, StatusCode::FORBIDDEN);
        assert_eq!(api.code, "UNAUTHORIZED_EDIT");
    }

    #[test]
    fn test_helpers() {
        assert_eq!(ApiError::bad_request("x").status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::forbidden("x").code, "FORBIDDEN");
        assert_eq!(ApiError::not_found("x").status, StatusCode::NOT_FOUND);
    }
}
