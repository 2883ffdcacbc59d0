//! Service offering model (the "Services" page)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: i64,
    pub slug: String,
    pub title: String,
    /// One-paragraph teaser shown on cards
    pub summary: String,
    pub description: Option<String>,
    /// Icon name or URL understood by the front end
    pub icon: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateServiceInput {
    pub title: String,
    pub slug: Option<String>,
    pub summary: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Absent fields are left unchanged; an empty string clears an optional one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateServiceInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}
