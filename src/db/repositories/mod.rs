//! Database repositories
//!
//! One trait plus one `Sqlx*Repository` per entity. Each implementation
//! runs the same SQL against SQLite or MySQL depending on the pool.

pub mod application;
pub mod blog;
pub mod contact;
pub mod job;
pub mod login_log;
pub mod service_offering;
pub mod session;
pub mod team_member;
pub mod user;

pub use application::{ApplicationRepository, NewApplication, SqlxApplicationRepository};
pub use blog::{BlogRepository, SqlxBlogRepository};
pub use contact::{ContactRepository, SqlxContactRepository};
pub use job::{JobRepository, SqlxJobRepository};
pub use login_log::{LoginLogRepository, SqlxLoginLogRepository};
pub use service_offering::{ServiceOfferingRepository, SqlxServiceOfferingRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use team_member::{SqlxTeamMemberRepository, TeamMemberRepository};
pub use user::{SqlxUserRepository, UserRepository};

use anyhow::Result;
use async_trait::async_trait;

/// Slug uniqueness check shared by every table with a `slug` column
#[async_trait]
pub trait SlugLookup: Send + Sync {
    /// Check whether `slug` is taken, ignoring the row `exclude_id`
    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;
}
