//! Channel metadata.

use axum::{
    Json, Router,
    extract::Path,
    routing::get,
};
use bap_core::import::{Channel, MetricLabels, metric_labels};

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};

/// Creates the channel routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/channels/{channel}/metric-labels", get(labels))
}

/// GET /channels/{channel}/metric-labels - Column labels for the metric slots.
async fn labels(_auth: AuthUser, Path(channel): Path<String>) -> ApiResult<Json<MetricLabels>> {
    let channel = Channel::parse(&channel)
        .ok_or_else(|| ApiError::not_found(format!("unknown channel '{channel}'")))?;
    Ok(Json(metric_labels(channel)))
}
