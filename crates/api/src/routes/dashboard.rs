//! Dashboard routes.
//!
//! Reads cover every finalized item; writes are checked per row against
//! the caller's username and reported back row by row.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use bap_core::dashboard::{
    ChannelSummary, DashboardFilter, DashboardRow, FieldEdit, MonthlyTotal, RowOutcome,
};
use bap_db::DashboardRepository;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};

/// Most edits accepted in one request.
const MAX_EDITS_PER_REQUEST: usize = 1000;

/// Creates the dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/items", get(list_items).patch(edit_items))
        .route("/dashboard/summary", get(summary))
        .route("/dashboard/trend", get(trend))
}

/// Query parameters for the monthly trend.
#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    /// Calendar year; defaults to the current one.
    pub year: Option<i32>,
}

/// Request body for dashboard edits.
#[derive(Debug, Deserialize)]
pub struct EditItemsRequest {
    /// Cell changes, possibly spanning many rows.
    pub edits: Vec<FieldEdit>,
}

/// Per-row results of an edit request.
#[derive(Debug, Serialize)]
pub struct EditItemsResponse {
    /// Rows written.
    pub accepted: usize,
    /// Rows left unchanged.
    pub rejected: usize,
    /// One outcome per edited row, in request order.
    pub results: Vec<RowOutcome>,
}

/// GET /dashboard/items?channel=
async fn list_items(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<DashboardFilter>,
) -> ApiResult<Json<Vec<DashboardRow>>> {
    let rows = DashboardRepository::new((*state.db).clone())
        .list(auth.actor(), &filter)
        .await?;
    Ok(Json(rows))
}

/// PATCH /dashboard/items
async fn edit_items(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<EditItemsRequest>,
) -> ApiResult<Json<EditItemsResponse>> {
    if payload.edits.len() > MAX_EDITS_PER_REQUEST {
        return Err(ApiError::bad_request(format!(
            "at most {MAX_EDITS_PER_REQUEST} edits per request"
        )));
    }

    let results = DashboardRepository::new((*state.db).clone())
        .apply(auth.actor(), payload.edits)
        .await?;
    let accepted = results.iter().filter(|r| r.is_accepted()).count();

    info!(
        actor = %auth.actor().username,
        accepted,
        rejected = results.len() - accepted,
        "Dashboard edits applied"
    );

    Ok(Json(EditItemsResponse {
        accepted,
        rejected: results.len() - accepted,
        results,
    }))
}

/// GET /dashboard/summary
async fn summary(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<ChannelSummary>>> {
    Ok(Json(
        DashboardRepository::new((*state.db).clone())
            .summary_by_channel()
            .await?,
    ))
}

/// GET /dashboard/trend?year=
async fn trend(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<TrendQuery>,
) -> ApiResult<Json<Vec<MonthlyTotal>>> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    Ok(Json(
        DashboardRepository::new((*state.db).clone())
            .monthly_trend(year)
            .await?,
    ))
}
