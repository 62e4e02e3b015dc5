//! Budget file upload and listing routes.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
};
use bap_core::import::{Channel, ImportWarning, normalize};
use bap_core::workflow::{FileStatus, Transition, WorkflowService};
use bap_db::{
    BudgetFileRepository, WorkflowRepository,
    entities::{budget_files, budget_items},
    repositories::StatusCount,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};

const DEFAULT_LIST_LIMIT: u64 = 100;
const MAX_LIST_LIMIT: u64 = 500;

/// Creates the budget file routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/files", get(list_files).post(upload_file))
        .route("/files/status-counts", get(status_counts))
        .route("/files/{file_id}", get(get_file))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing files.
#[derive(Debug, Default, Deserialize)]
pub struct ListFilesQuery {
    /// Status filter, e.g. `pending_approval`.
    pub status: Option<String>,
    /// Only files uploaded by the caller.
    #[serde(default)]
    pub mine: bool,
    /// Maximum number of files.
    pub limit: Option<u64>,
}

/// Response for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// The stored file, pending approval.
    pub file: budget_files::Model,
    /// Number of items imported.
    pub items_imported: i32,
    /// 1-based row of the detected header.
    pub header_row: usize,
    /// Row-level and file-level warnings.
    pub warnings: Vec<ImportWarning>,
    /// Earlier file with byte-identical content, if any.
    pub duplicate_of: Option<Uuid>,
}

/// A file with its items and the actions open to the caller.
#[derive(Debug, Serialize)]
pub struct FileDetailResponse {
    /// The file.
    pub file: budget_files::Model,
    /// Its items in spreadsheet order.
    pub items: Vec<budget_items::Model>,
    /// Transitions the caller may attempt now.
    pub permitted_actions: Vec<Transition>,
}

/// One uploaded multipart part.
pub(crate) struct UploadedPart {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Reads the `file` part and any text fields from a multipart body.
pub(crate) async fn read_multipart(
    mut multipart: Multipart,
) -> ApiResult<(Option<UploadedPart>, Vec<(String, String)>)> {
    let mut file = None;
    let mut fields = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;
            file = Some(UploadedPart {
                filename,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("failed to read field '{name}': {e}")))?;
            fields.push((name, value));
        }
    }

    Ok((file, fields))
}

fn parse_status(raw: Option<&str>) -> ApiResult<Option<FileStatus>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => FileStatus::parse(s)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(format!("unknown status '{s}'"))),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /files - Upload a budget spreadsheet (multipart `file`, `channel`).
async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    WorkflowService::authorize_upload(auth.role())?;

    let (file, fields) = read_multipart(multipart).await?;
    let file = file.ok_or_else(|| ApiError::bad_request("multipart field 'file' is required"))?;
    let declared = fields
        .iter()
        .find(|(name, _)| name == "channel")
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request("multipart field 'channel' is required"))?;
    let channel = Channel::parse(declared).unwrap_or(Channel::Other);

    let UploadedPart { filename, bytes } = file;
    let settings = state.import.clone();
    let uploader = auth.actor().username.clone();
    let parse_name = filename.clone();
    let (bytes, parsed) = tokio::task::spawn_blocking(move || {
        let parsed = normalize(&bytes, &parse_name, channel, &uploader, &settings);
        (bytes, parsed)
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Spreadsheet parsing task failed");
        ApiError::from(bap_shared::AppError::Internal("failed to parse upload".into()))
    })?;
    let sheet = parsed?;

    let repo = BudgetFileRepository::new((*state.db).clone());
    let duplicate = repo.find_by_content_hash(&sheet.content_hash).await?;

    let mut warnings = sheet.warnings.clone();
    if let Some(existing) = &duplicate {
        warnings.insert(
            0,
            ImportWarning::file(format!(
                "identical content was already uploaded as '{}' ({})",
                existing.filename, existing.id
            )),
        );
    }

    let created = WorkflowRepository::new((*state.db).clone(), state.documents.clone())
        .submit(auth.actor(), &filename, channel, &sheet, bytes)
        .await?;

    info!(
        file_id = %created.file.id,
        channel = %channel,
        rows = sheet.row_count,
        warnings = warnings.len(),
        duplicate = duplicate.is_some(),
        "Budget file uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            items_imported: created.file.row_count,
            file: created.file,
            header_row: sheet.header_row,
            warnings,
            duplicate_of: duplicate.map(|d| d.id),
        }),
    ))
}

/// GET /files - List files, newest first.
async fn list_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListFilesQuery>,
) -> ApiResult<Json<Vec<budget_files::Model>>> {
    let status = parse_status(query.status.as_deref())?;
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    let repo = BudgetFileRepository::new((*state.db).clone());

    let files = match (query.mine, status) {
        (true, status) => repo.list_by_uploader(auth.actor().id, status, limit).await?,
        (false, Some(status)) => repo.list_by_status(status, limit).await?,
        (false, None) => repo.list_recent(limit).await?,
    };
    Ok(Json(files))
}

/// GET /files/status-counts - Number of files per status.
async fn status_counts(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<StatusCount>>> {
    let counts = BudgetFileRepository::new((*state.db).clone())
        .status_counts()
        .await?;
    Ok(Json(counts))
}

/// GET /files/{file_id} - File, items and the caller's permitted actions.
async fn get_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<Uuid>,
) -> ApiResult<Json<FileDetailResponse>> {
    let found = BudgetFileRepository::new((*state.db).clone())
        .find_with_items(file_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("budget file {file_id} not found")))?;

    let permitted_actions =
        WorkflowService::permitted_actions(auth.role(), found.file.status.into());
    Ok(Json(FileDetailResponse {
        file: found.file,
        items: found.items,
        permitted_actions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(parse_status(Some(" ")).unwrap(), None);
        assert_eq!(
            parse_status(Some("SIGNING")).unwrap(),
            Some(FileStatus::Signing)
        );
        assert!(parse_status(Some("archived")).is_err());
    }
}
