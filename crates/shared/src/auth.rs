//! Authentication payloads and JWT claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Login name; also the key matched against `specialist` on budget items.
    pub username: String,
    /// Role name (`planner`, `manager`, `admin`).
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, username: &str, role: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: user_id,
            username: username.to_string(),
            role: role.to_string(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Authenticated user info.
    pub user: UserInfo,
    /// Access token.
    pub access_token: String,
    /// Token expiration in seconds.
    pub expires_in: i64,
}

/// User info returned in auth and user-management responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Role name.
    pub role: String,
}

/// Admin request to create a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    /// Unique login name.
    pub username: String,
    /// Initial password.
    pub password: String,
    /// Display name.
    pub full_name: String,
    /// Role name.
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_new_sets_fields() {
        let user_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(1);

        let claims = Claims::new(user_id, "bat-erdene", "planner", expires_at);

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.username, "bat-erdene");
        assert_eq!(claims.role, "planner");
        assert!(claims.iat <= Utc::now().timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn test_login_request_deserializes() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"manager","password":"pw"}"#).expect("valid json");
        assert_eq!(req.username, "manager");
        assert_eq!(req.password, "pw");
    }
}
