//! User model
//!
//! Back-office accounts. The role decides which admin areas a user may
//! reach; see the allow-lists in `api::mod`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Email address (unique, stored lowercase)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with an already hashed password.
    pub fn new(name: String, email: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name,
            email,
            password_hash,
            role,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Check the user's role against an allow-list
    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        roles.contains(&self.role)
    }
}

/// User role for authorization.
///
/// - Admin: everything, including users and contact messages
/// - Editor: blogs, services, team
/// - Hr: jobs and applications
/// - User: no back-office access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
    Hr,
    #[default]
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Editor => "editor",
            UserRole::Hr => "hr",
            UserRole::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "editor" => Ok(UserRole::Editor),
            "hr" => Ok(UserRole::Hr),
            "user" => Ok(UserRole::User),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Account state. Disabled users cannot log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Disabled,
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Disabled => write!(f, "disabled"),
        }
    }
}

impl FromStr for UserStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "disabled" => Ok(UserStatus::Disabled),
            _ => Err(anyhow::anyhow!("Invalid user status: {}", s)),
        }
    }
}

/// Registration payload (plaintext password, hashed by the service)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Admin changes to another account
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn user_with_role(role: UserRole) -> User {
        User::new("Ada".into(), "ada@zuree.com".into(), "hash".into(), role)
    }

    #[test]
    fn test_user_new() {
        let user = user_with_role(UserRole::Editor);
        assert_eq!(user.id, 0);
        assert_eq!(user.status, UserStatus::Active);
        assert!(user.is_active());
        assert!(!user.is_admin());
    }

    #[test]
    fn test_has_any_role() {
        let hr = user_with_role(UserRole::Hr);
        assert!(hr.has_any_role(&[UserRole::Admin, UserRole::Hr]));
        assert!(!hr.has_any_role(&[UserRole::Admin, UserRole::Editor]));
        assert!(!hr.has_any_role(&[]));
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(UserRole::from_str("ADMIN").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("hr").unwrap(), UserRole::Hr);
        assert!(UserRole::from_str("author").is_err());
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!(UserStatus::from_str("disabled").unwrap(), UserStatus::Disabled);
        assert_eq!(UserStatus::Disabled.to_string(), "disabled");
        assert!(UserStatus::from_str("banned").is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(user_with_role(UserRole::User)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "user");
    }

    proptest! {
        #[test]
        fn prop_role_display_parses_back(idx in 0usize..4) {
            let roles = [UserRole::Admin, UserRole::Editor, UserRole::Hr, UserRole::User];
            let role = roles[idx];
            prop_assert_eq!(UserRole::from_str(&role.to_string()).unwrap(), role);
        }
    }
}
