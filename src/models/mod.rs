//! Data models
//!
//! Entities stored by the API, the enums behind their status and role
//! columns, and the input types accepted by create/update endpoints.

mod application;
mod blog;
mod contact;
mod job;
mod login_log;
mod pagination;
mod service_offering;
mod session;
mod team_member;
mod user;

pub use application::{
    Application, ApplicationFilter, ApplicationStatus, CreateApplicationInput,
    UpdateApplicationStatusInput,
};
pub use blog::{BlogFilter, BlogPost, CreateBlogInput, PostStatus, UpdateBlogInput};
pub use contact::{ContactFilter, ContactMessage, ContactStatus, CreateContactInput, UpdateContactStatusInput};
pub use job::{CreateJobInput, EmploymentType, Job, JobFilter, JobStatus, UpdateJobInput};
pub use login_log::{LoginAttempt, LoginLog};
pub use pagination::{ListParams, PagedResult};
pub use service_offering::{CreateServiceInput, ServiceOffering, UpdateServiceInput};
pub use session::Session;
pub use team_member::{CreateTeamMemberInput, TeamMember, UpdateTeamMemberInput};
pub use user::{CreateUserInput, UpdateUserInput, User, UserRole, UserStatus};

/// Trim an optional text field, turning blank strings into `None`.
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional(None), None);
        assert_eq!(clean_optional(Some("   ".into())), None);
        assert_eq!(clean_optional(Some(" Lagos ".into())), Some("Lagos".into()));
    }
}
