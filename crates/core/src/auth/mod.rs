//! Authentication, roles, and the per-request actor.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Role definitions and role parsing
//! - [`Actor`], the explicit identity passed into every service call

mod password;

pub use password::{PasswordError, hash_password, verify_password};

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// User roles on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Uploads spreadsheets, generates PDFs, uploads signed scans, finalizes.
    Planner,
    /// Approves or rejects pending uploads.
    Manager,
    /// Every permission of the other two roles plus user management.
    Admin,
}

impl Role {
    /// All roles.
    pub const ALL: [Self; 3] = [Self::Planner, Self::Manager, Self::Admin];

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Parses a role from a string, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "planner" => Some(Self::Planner),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns true if this role can upload new budget spreadsheets.
    #[must_use]
    pub const fn can_upload(&self) -> bool {
        matches!(self, Self::Planner | Self::Admin)
    }

    /// Returns true if this role can manage user accounts.
    #[must_use]
    pub const fn can_manage_users(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// User ID.
    pub id: Uuid,
    /// Login name, matched against `specialist` for dashboard edits.
    pub username: String,
    /// Role.
    pub role: Role,
}

impl Actor {
    /// Creates a new actor.
    #[must_use]
    pub fn new(id: Uuid, username: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            username: username.into(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("planner", Some(Role::Planner))]
    #[case("MANAGER", Some(Role::Manager))]
    #[case(" Admin ", Some(Role::Admin))]
    #[case("viewer", None)]
    #[case("", None)]
    fn test_role_parse(#[case] input: &str, #[case] expected: Option<Role>) {
        assert_eq!(Role::parse(input), expected);
    }

    #[test]
    fn test_role_roundtrip() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
            assert_eq!(role.to_string(), role.as_str());
        }
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Planner.can_upload());
        assert!(Role::Admin.can_upload());
        assert!(!Role::Manager.can_upload());

        assert!(Role::Admin.can_manage_users());
        assert!(!Role::Planner.can_manage_users());
        assert!(!Role::Manager.can_manage_users());
    }
}
