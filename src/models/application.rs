//! Job application model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Application submitted through the careers page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    /// Title of the job applied for, joined from `jobs`
    pub job_title: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Link to an uploaded CV
    pub resume_url: Option<String>,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review state of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Shortlisted,
    Rejected,
    Hired,
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        };
        f.write_str(s)
    }
}

impl FromStr for ApplicationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "reviewed" => Ok(ApplicationStatus::Reviewed),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "hired" => Ok(ApplicationStatus::Hired),
            _ => Err(anyhow::anyhow!("Invalid application status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateApplicationInput {
    pub job_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub resume_url: Option<String>,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateApplicationStatusInput {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationFilter {
    pub job_id: Option<i64>,
    pub status: Option<ApplicationStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_display() {
        let status: ApplicationStatus = "Shortlisted".parse().unwrap();
        assert_eq!(status, ApplicationStatus::Shortlisted);
        assert_eq!(status.to_string(), "shortlisted");
        assert!("accepted".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_status_input_rejects_unknown_value() {
        let parsed: Result<UpdateApplicationStatusInput, _> =
            serde_json::from_str(r#"{"status": "maybe"}"#);
        assert!(parsed.is_err());
    }
}
