//! Error type shared by the content services

/// Errors returned by blog, career, contact, catalog and team services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Invalid input
    #[error("{0}")]
    Validation(String),

    /// Entity does not exist (or is hidden from the caller)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Uniqueness clash, e.g. a duplicate slug or application
    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

/// Check whether a repository error is a unique-constraint violation
pub(crate) fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|e| e.is_unique_violation())
}
