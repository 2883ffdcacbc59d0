//! Blog post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    /// Markdown source
    pub content: String,
    /// Rendered HTML
    pub content_html: String,
    /// Cover image URL
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub author_id: Option<i64>,
    /// Author display name, joined from `users`
    #[serde(default)]
    pub author_name: Option<String>,
    pub status: PostStatus,
    /// Set the first time the post is published
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}

/// Publication state of a blog post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostStatus::Draft => write!(f, "draft"),
            PostStatus::Published => write!(f, "published"),
        }
    }
}

impl FromStr for PostStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            _ => Err(anyhow::anyhow!("Invalid post status: {}", s)),
        }
    }
}

/// Input for creating a blog post
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBlogInput {
    pub title: String,
    /// Explicit slug; generated from the title when absent
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub status: Option<PostStatus>,
}

/// Input for updating a blog post.
///
/// Absent fields are left unchanged; an empty string clears an optional one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBlogInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub status: Option<PostStatus>,
}

/// Filters for blog listings
#[derive(Debug, Clone, Default)]
pub struct BlogFilter {
    pub status: Option<PostStatus>,
    pub category: Option<String>,
    /// Matched against title and excerpt
    pub search: Option<String>,
}

impl BlogFilter {
    /// Filter used by the public site: published posts only
    pub fn published() -> Self {
        Self {
            status: Some(PostStatus::Published),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_status_default_is_draft() {
        assert_eq!(PostStatus::default(), PostStatus::Draft);
    }

    #[test]
    fn test_post_status_parse() {
        assert_eq!("Published".parse::<PostStatus>().unwrap(), PostStatus::Published);
        assert!("archived".parse::<PostStatus>().is_err());
    }

    #[test]
    fn test_create_input_from_json() {
        let input: CreateBlogInput = serde_json::from_str(
            r#"{"title": "5G rollout", "content": "We are live.", "status": "published"}"#,
        )
        .unwrap();
        assert_eq!(input.status, Some(PostStatus::Published));
        assert!(input.slug.is_none());
    }
}
