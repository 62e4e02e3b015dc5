//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Bearer-token authentication middleware and the [`middleware::AuthUser`] extractor
//! - JSON error mapping for every domain error

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use bap_core::document::DocumentStore;
use bap_shared::config::ImportSettings;
use bap_shared::jwt::JwtService;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Store for summary PDFs and signed scans.
    pub documents: DocumentStore,
    /// Spreadsheet import limits.
    pub import: Arc<ImportSettings>,
}

impl AppState {
    /// Largest request body the router accepts.
    #[must_use]
    pub fn body_limit(&self) -> usize {
        let largest = self
            .import
            .max_upload_bytes
            .max(self.documents.config().max_document_bytes);
        usize::try_from(largest.saturating_add(MULTIPART_OVERHEAD_BYTES)).unwrap_or(usize::MAX)
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::max(state.body_limit()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
