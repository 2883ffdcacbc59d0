//! Login audit log

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stored login attempt
#[derive(Debug, Clone, Serialize)]
pub struct LoginLog {
    pub id: i64,
    pub email: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub success: bool,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A login attempt about to be recorded
#[derive(Debug, Clone, Default)]
pub struct LoginAttempt {
    pub email: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub success: bool,
    pub failure_reason: Option<String>,
}

impl LoginAttempt {
    pub fn succeeded(email: &str, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            email: email.to_lowercase(),
            ip_address,
            user_agent,
            success: true,
            failure_reason: None,
        }
    }

    pub fn failed(
        email: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
        reason: &str,
    ) -> Self {
        Self {
            email: email.to_lowercase(),
            ip_address,
            user_agent,
            success: false,
            failure_reason: Some(reason.to_string()),
        }
    }
}
