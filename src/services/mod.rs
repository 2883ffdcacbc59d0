//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories. They
//! validate input, generate slugs, render Markdown, hash passwords, manage
//! sessions and decide which rows the public site may see.

pub mod blog;
pub mod career;
pub mod catalog;
pub mod contact;
pub mod email;
pub mod error;
pub mod markdown;
pub mod password;
pub mod rate_limiter;
pub mod team;
pub mod user;
pub mod validation;

pub use blog::BlogService;
pub use career::CareerService;
pub use catalog::CatalogService;
pub use contact::ContactService;
pub use email::{ContactNotifier, DisabledNotifier, EmailService};
pub use error::ServiceError;
pub use markdown::MarkdownRenderer;
pub use password::{hash_password, verify_password};
pub use rate_limiter::LoginRateLimiter;
pub use team::TeamService;
pub use user::{LoginInput, UserService, UserServiceError};
pub use validation::generate_slug;
