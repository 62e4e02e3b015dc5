//! User management (admin only).

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use bap_core::auth::{Role, hash_password};
use bap_db::{UserRepository, entities::users};
use bap_shared::{
    AppError,
    auth::{CreateUserRequest, UserInfo},
};
use tracing::{error, info};

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users).post(create_user))
}

fn require_admin(auth: &AuthUser) -> ApiResult<()> {
    if auth.role().can_manage_users() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Only administrators can manage users"))
    }
}

fn user_info(user: users::Model) -> UserInfo {
    UserInfo {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        role: Role::from(user.role).as_str().to_string(),
    }
}

/// GET /users - List accounts.
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<UserInfo>>> {
    require_admin(&auth)?;
    let users = UserRepository::new((*state.db).clone()).list().await?;
    Ok(Json(users.into_iter().map(user_info).collect()))
}

/// POST /users - Create an account.
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    require_admin(&auth)?;

    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }
    let role = Role::parse(&payload.role).ok_or_else(|| {
        AppError::Unprocessable(format!("unknown role '{}'", payload.role))
    })?;

    let user_repo = UserRepository::new((*state.db).clone());
    if user_repo.username_exists(username).await? {
        return Err(AppError::Conflict(format!("username '{username}' is taken")).into());
    }

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        AppError::Internal("An error occurred while creating the user".into())
    })?;

    let user = user_repo
        .create(username, &password_hash, payload.full_name.trim(), role)
        .await?;

    info!(user_id = %user.id, role = %role, created_by = %auth.actor().username, "User created");
    Ok((StatusCode::CREATED, Json(user_info(user))))
}
