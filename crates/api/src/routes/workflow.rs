//! Workflow transition and document routes.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bap_db::{
    WorkflowRepository,
    entities::budget_files,
    repositories::StoredDocument,
};
use serde::Deserialize;
use uuid::Uuid;

use super::files::read_multipart;
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};

/// Creates the workflow routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/files/{file_id}/approve", post(approve))
        .route("/files/{file_id}/reject", post(reject))
        .route("/files/{file_id}/pdf", post(generate_pdf).get(download_pdf))
        .route(
            "/files/{file_id}/signed",
            post(upload_signed).get(download_signed),
        )
        .route("/files/{file_id}/finalize", post(finalize))
        .route("/files/{file_id}/source", get(download_source))
}

/// Request body for rejecting a file.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Why the file was rejected.
    pub reason: String,
}

fn repository(state: &AppState) -> WorkflowRepository {
    WorkflowRepository::new((*state.db).clone(), state.documents.clone())
}

/// Extension after the last dot, or the empty string.
fn extension_of(name: &str) -> &str {
    name.rsplit_once('.').map_or("", |(_, ext)| ext)
}

fn content_type(path: &str) -> &'static str {
    match extension_of(path).to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "csv" => "text/csv",
        _ => "application/octet-stream",
    }
}

fn document_response(document: StoredDocument) -> Response {
    let filename = document
        .path
        .rsplit('/')
        .next()
        .unwrap_or(document.path.as_str())
        .to_string();
    (
        [
            (header::CONTENT_TYPE, content_type(&document.path).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        document.bytes,
    )
        .into_response()
}

/// POST /files/{file_id}/approve
async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<Uuid>,
) -> ApiResult<Json<budget_files::Model>> {
    Ok(Json(repository(&state).approve(file_id, auth.actor()).await?))
}

/// POST /files/{file_id}/reject
async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> ApiResult<Json<budget_files::Model>> {
    Ok(Json(
        repository(&state)
            .reject(file_id, auth.actor(), &payload.reason)
            .await?,
    ))
}

/// POST /files/{file_id}/pdf - Render and store the summary PDF.
async fn generate_pdf(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<Uuid>,
) -> ApiResult<Json<budget_files::Model>> {
    Ok(Json(
        repository(&state)
            .generate_pdf(file_id, auth.actor())
            .await?,
    ))
}

/// GET /files/{file_id}/pdf
async fn download_pdf(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(file_id): Path<Uuid>,
) -> ApiResult<Response> {
    Ok(document_response(repository(&state).read_pdf(file_id).await?))
}

/// POST /files/{file_id}/signed - Upload the signed scan (multipart `file`).
async fn upload_signed(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<budget_files::Model>> {
    let (file, _) = read_multipart(multipart).await?;
    let file = file.ok_or_else(|| ApiError::bad_request("multipart field 'file' is required"))?;
    let extension = extension_of(&file.filename).to_string();

    Ok(Json(
        repository(&state)
            .upload_signed(file_id, auth.actor(), file.bytes, &extension)
            .await?,
    ))
}

/// GET /files/{file_id}/signed
async fn download_signed(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(file_id): Path<Uuid>,
) -> ApiResult<Response> {
    Ok(document_response(
        repository(&state).read_signed(file_id).await?,
    ))
}

/// GET /files/{file_id}/source - The spreadsheet as uploaded.
async fn download_source(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(file_id): Path<Uuid>,
) -> ApiResult<Response> {
    Ok(document_response(
        repository(&state).read_source(file_id).await?,
    ))
}

/// POST /files/{file_id}/finalize
async fn finalize(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<Uuid>,
) -> ApiResult<Json<budget_files::Model>> {
    Ok(Json(repository(&state).finalize(file_id, auth.actor()).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("scan.PDF", "PDF")]
    #[case("a.b.jpeg", "jpeg")]
    #[case("noext", "")]
    fn test_extension_of(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(extension_of(name), expected);
    }

    #[rstest]
    #[case("pdf/x/1_bat.pdf", "application/pdf")]
    #[case("signed/x/1_bat.JPG", "image/jpeg")]
    #[case("signed/x/1_bat.png", "image/png")]
    #[case("source/x/1_bat.csv", "text/csv")]
    #[case("source/x/1_bat.XLS", "application/vnd.ms-excel")]
    #[case("signed/x/1_bat", "application/octet-stream")]
    fn test_content_type(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(content_type(path), expected);
    }
}
