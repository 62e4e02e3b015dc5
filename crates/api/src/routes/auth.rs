//! Login.

use axum::{Json, Router, extract::State, routing::post};
use bap_core::auth::{Role, verify_password};
use bap_db::UserRepository;
use bap_shared::{
    AppError,
    auth::{LoginRequest, LoginResponse, UserInfo},
};
use tracing::{error, info, warn};

use crate::{AppState, error::ApiResult};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid username or password".into())
}

/// POST /auth/login - Authenticate and return an access token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user_repo = UserRepository::new((*state.db).clone());

    let Some(user) = user_repo.find_by_username(payload.username.trim()).await? else {
        info!(username = %payload.username, "Login attempt for non-existent user");
        return Err(invalid_credentials().into());
    };

    if !user.is_active {
        return Err(AppError::Unauthorized("This account has been disabled".into()).into());
    }

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return Err(invalid_credentials().into());
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return Err(AppError::Internal("An error occurred during login".into()).into());
        }
    }

    let role = Role::from(user.role);
    let access_token = state
        .jwt_service
        .generate_access_token(user.id, &user.username, role.as_str())
        .map_err(|e| {
            error!(error = %e, "Failed to generate access token");
            AppError::Internal("An error occurred during login".into())
        })?;

    if let Err(e) = user_repo.touch_last_login(user.id).await {
        warn!(user_id = %user.id, error = %e, "Failed to record last login");
    }

    info!(user_id = %user.id, role = %role, "User logged in");

    Ok(Json(LoginResponse {
        user: UserInfo {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: role.as_str().to_string(),
        },
        access_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    }))
}
