//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod auth;
pub mod channels;
pub mod dashboard;
pub mod files;
pub mod health;
pub mod users;
pub mod workflow;

/// Creates the API router; everything except health and login needs a token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(users::routes())
        .merge(files::routes())
        .merge(workflow::routes())
        .merge(dashboard::routes())
        .merge(channels::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
