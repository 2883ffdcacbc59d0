//! User service
//!
//! - Registration (the first user becomes admin)
//! - Login with rate limiting and an audit trail in `login_logs`
//! - Session validation, logout and periodic cleanup
//! - Profile/password changes and user administration

use crate::db::repositories::{LoginLogRepository, SessionRepository, UserRepository};
use crate::models::{
    CreateUserInput, ListParams, LoginAttempt, LoginLog, PagedResult, Session, UpdateUserInput,
    User, UserRole, UserStatus,
};
use crate::services::password::{hash_password, verify_password};
use crate::services::rate_limiter::LoginRateLimiter;
use crate::services::validation::{self, MIN_PASSWORD_CHARS};
use anyhow::Context;
use chrono::Duration;
use std::net::IpAddr;
use std::sync::Arc;
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Invalid credentials or disabled account
    #[error("{0}")]
    AuthenticationError(String),

    #[error("{0}")]
    ValidationError(String),

    /// Email already registered
    #[error("{0}")]
    UserExists(String),

    #[error("Registration is closed")]
    RegistrationClosed,

    /// Too many login attempts; retry after the given number of seconds
    #[error("Too many login attempts, try again in {retry_after} seconds")]
    RateLimited { retry_after: i64 },

    #[error("User not found")]
    NotFound,

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Credentials plus request metadata recorded with the attempt
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
}

impl LoginInput {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ip: None,
            user_agent: None,
        }
    }
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    login_log_repo: Arc<dyn LoginLogRepository>,
    rate_limiter: Arc<LoginRateLimiter>,
    session_ttl: Duration,
    allow_registration: bool,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        login_log_repo: Arc<dyn LoginLogRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            login_log_repo,
            rate_limiter: Arc::new(LoginRateLimiter::new()),
            session_ttl: Duration::hours(24),
            allow_registration: true,
        }
    }

    /// Set how long new sessions live
    pub fn with_session_ttl(mut self, hours: i64) -> Self {
        self.session_ttl = Duration::hours(hours);
        self
    }

    /// Allow or refuse self-registration (the first account is always allowed)
    pub fn with_registration(mut self, allow: bool) -> Self {
        self.allow_registration = allow;
        self
    }

    pub fn rate_limiter(&self) -> Arc<LoginRateLimiter> {
        self.rate_limiter.clone()
    }

    /// Register a new user.
    ///
    /// The first user in an empty table becomes `admin`; everyone else `user`.
    pub async fn register(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        let name = validation::required(&input.name, "Name", 100)
            .map_err(|e| UserServiceError::ValidationError(e.to_string()))?;
        let email = validation::email(&input.email)
            .map_err(|e| UserServiceError::ValidationError(e.to_string()))?;
        validate_password(&input.password)?;

        let is_first = self.is_first_user().await?;
        if !is_first && !self.allow_registration {
            return Err(UserServiceError::RegistrationClosed);
        }

        if self
            .user_repo
            .get_by_email(&email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let role = if is_first { UserRole::Admin } else { UserRole::User };
        let password_hash = hash_password(&input.password)?;
        let user = self
            .user_repo
            .create(&User::new(name, email, password_hash, role))
            .await
            .context("Failed to create user")?;
        let user = if is_first { self.settle_first_user(user).await? } else { user };

        tracing::info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Register an account and open a session for it.
    ///
    /// The session is created directly, so login rate limits never turn a
    /// stored registration into an error.
    pub async fn register_and_login(
        &self,
        input: CreateUserInput,
        ip: Option<IpAddr>,
        user_agent: Option<String>,
    ) -> Result<(Session, User), UserServiceError> {
        let user = self.register(input).await?;
        let session = self.create_session(user.id).await?;
        self.log_attempt(LoginAttempt::succeeded(
            &user.email,
            ip.map(|ip| ip.to_string()),
            user_agent,
        ))
        .await;
        Ok((session, user))
    }

    /// Keep `admin` only for the lowest id when concurrent registrations all
    /// saw an empty table.
    async fn settle_first_user(&self, mut user: User) -> Result<User, UserServiceError> {
        let earlier = self
            .user_repo
            .count_before(user.id)
            .await
            .context("Failed to count earlier users")?;
        if earlier == 0 {
            return Ok(user);
        }

        tracing::warn!(user_id = user.id, "Lost the first-user race");
        if !self.allow_registration {
            self.user_repo
                .delete(user.id)
                .await
                .context("Failed to delete user")?;
            return Err(UserServiceError::RegistrationClosed);
        }

        user.role = UserRole::User;
        let user = self
            .user_repo
            .update(&user)
            .await
            .context("Failed to update user")?;
        Ok(user)
    }

    /// Verify credentials and open a session.
    pub async fn login(&self, input: LoginInput) -> Result<(Session, User), UserServiceError> {
        let email = input.email.trim().to_lowercase();
        let ip_address = input.ip.map(|ip| ip.to_string());

        if let Some(ip) = input.ip {
            if let Some(retry_after) = self.rate_limiter.hit_ip(ip).await {
                tracing::warn!(%ip, "Login rate limit hit for IP");
                return Err(UserServiceError::RateLimited { retry_after });
            }
        }
        if let Some(retry_after) = self.rate_limiter.email_retry_after(&email).await {
            self.log_attempt(LoginAttempt::failed(&email, ip_address, input.user_agent, "rate_limited"))
                .await;
            return Err(UserServiceError::RateLimited { retry_after });
        }

        let user = match self
            .user_repo
            .get_by_email(&email)
            .await
            .context("Failed to get user by email")?
        {
            Some(user) => user,
            None => {
                self.rate_limiter.record_failure(&email).await;
                self.log_attempt(LoginAttempt::failed(&email, ip_address, input.user_agent, "user_not_found"))
                    .await;
                return Err(UserServiceError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !verify_password(&input.password, &user.password_hash)? {
            self.rate_limiter.record_failure(&email).await;
            self.log_attempt(LoginAttempt::failed(&email, ip_address, input.user_agent, "invalid_password"))
                .await;
            return Err(UserServiceError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
        }

        if !user.is_active() {
            self.log_attempt(LoginAttempt::failed(&email, ip_address, input.user_agent, "user_disabled"))
                .await;
            return Err(UserServiceError::AuthenticationError(
                "This account has been disabled".to_string(),
            ));
        }

        self.rate_limiter.clear_failures(&email).await;
        let session = self.create_session(user.id).await?;
        self.log_attempt(LoginAttempt::succeeded(&email, ip_address, input.user_agent))
            .await;

        tracing::info!(user_id = user.id, "User logged in");
        Ok((session, user))
    }

    /// Delete the session behind `token`. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a bearer token to its user.
    ///
    /// Returns `None` for unknown or expired sessions (the latter are deleted)
    /// and for disabled users.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let Some(session) = self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        else {
            return Ok(None);
        };

        if session.is_expired() {
            if let Err(e) = self.session_repo.delete(token).await {
                tracing::warn!("Failed to delete expired session: {}", e);
            }
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user.filter(User::is_active))
    }

    /// Change the caller's password after checking the current one
    pub async fn change_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), UserServiceError> {
        if !verify_password(current_password, &user.password_hash)? {
            return Err(UserServiceError::ValidationError(
                "Current password is incorrect".to_string(),
            ));
        }
        validate_password(new_password)?;

        let updated = User {
            password_hash: hash_password(new_password)?,
            ..user.clone()
        };
        self.user_repo
            .update(&updated)
            .await
            .context("Failed to update password")?;

        tracing::info!(user_id = user.id, "Password changed");
        Ok(())
    }

    /// Update the caller's display name
    pub async fn update_profile(&self, user: &User, name: &str) -> Result<User, UserServiceError> {
        let name = validation::required(name, "Name", 100)
            .map_err(|e| UserServiceError::ValidationError(e.to_string()))?;

        let updated = self
            .user_repo
            .update(&User {
                name,
                ..user.clone()
            })
            .await
            .context("Failed to update profile")?;
        Ok(updated)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?;
        Ok(user)
    }

    pub async fn list(&self, params: &ListParams) -> Result<PagedResult<User>, UserServiceError> {
        let (users, total) = self
            .user_repo
            .list(params)
            .await
            .context("Failed to list users")?;
        Ok(PagedResult::new(users, total, params))
    }

    pub async fn count(&self) -> Result<i64, UserServiceError> {
        Ok(self.user_repo.count().await.context("Failed to count users")?)
    }

    /// Change another user's role or status.
    ///
    /// An admin cannot demote or disable themselves. Any change revokes the
    /// target's sessions.
    pub async fn admin_update(
        &self,
        actor: &User,
        id: i64,
        input: UpdateUserInput,
    ) -> Result<User, UserServiceError> {
        let existing = self.get_by_id(id).await?.ok_or(UserServiceError::NotFound)?;

        if existing.id == actor.id {
            if input.role.is_some_and(|r| r != existing.role) {
                return Err(UserServiceError::ValidationError(
                    "You cannot change your own role".to_string(),
                ));
            }
            if input.status == Some(UserStatus::Disabled) {
                return Err(UserServiceError::ValidationError(
                    "You cannot disable your own account".to_string(),
                ));
            }
        }

        let updated = User {
            role: input.role.unwrap_or(existing.role),
            status: input.status.unwrap_or(existing.status),
            ..existing.clone()
        };
        if updated.role == existing.role && updated.status == existing.status {
            return Ok(existing);
        }

        let saved = self
            .user_repo
            .update(&updated)
            .await
            .context("Failed to update user")?;
        let revoked = self
            .session_repo
            .delete_by_user(id)
            .await
            .context("Failed to revoke sessions")?;

        tracing::info!(
            actor_id = actor.id,
            user_id = id,
            role = %saved.role,
            status = %saved.status,
            revoked,
            "User updated by admin"
        );
        Ok(saved)
    }

    /// Delete another user. Their blog posts keep existing without an author.
    pub async fn admin_delete(&self, actor: &User, id: i64) -> Result<(), UserServiceError> {
        if actor.id == id {
            return Err(UserServiceError::ValidationError(
                "You cannot delete your own account".to_string(),
            ));
        }
        self.get_by_id(id).await?.ok_or(UserServiceError::NotFound)?;

        self.user_repo
            .delete(id)
            .await
            .context("Failed to delete user")?;
        tracing::info!(actor_id = actor.id, user_id = id, "User deleted by admin");
        Ok(())
    }

    /// Recent login attempts, newest first
    pub async fn login_logs(
        &self,
        params: &ListParams,
    ) -> Result<PagedResult<LoginLog>, UserServiceError> {
        let (logs, total) = self
            .login_log_repo
            .list(params)
            .await
            .context("Failed to list login logs")?;
        Ok(PagedResult::new(logs, total, params))
    }

    /// Delete expired sessions, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, UserServiceError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;
        Ok(count)
    }

    /// `true` when no users exist yet
    pub async fn is_first_user(&self) -> Result<bool, UserServiceError> {
        Ok(self.count().await? == 0)
    }

    async fn create_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let session = Session::new(Uuid::new_v4().to_string(), user_id, self.session_ttl);
        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;
        Ok(created)
    }

    async fn log_attempt(&self, attempt: LoginAttempt) {
        if let Err(e) = self.login_log_repo.record(&attempt).await {
            tracing::warn!("Failed to record login attempt: {}", e);
        }
    }
}

fn validate_password(password: &str) -> Result<(), UserServiceError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(UserServiceError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxLoginLogRepository, SqlxSessionRepository, SqlxUserRepository,
    };
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> UserService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            SqlxLoginLogRepository::boxed(pool),
        )
    }

    fn register_input(name: &str, email: &str) -> CreateUserInput {
        CreateUserInput {
            name: name.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_user_becomes_admin() {
        let service = setup_test_service().await;

        let first = service.register(register_input("Admin", "admin@zuree.com")).await.unwrap();
        let second = service.register(register_input("Visitor", "visitor@zuree.com")).await.unwrap();

        assert_eq!(first.role, UserRole::Admin);
        assert_eq!(second.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = setup_test_service().await;

        let short = CreateUserInput {
            password: "short".into(),
            ..register_input("Ada", "ada@zuree.com")
        };
        assert!(matches!(service.register(short).await, Err(UserServiceError::ValidationError(_))));

        let bad_email = register_input("Ada", "not-an-email");
        assert!(matches!(service.register(bad_email).await, Err(UserServiceError::ValidationError(_))));

        let blank_name = register_input("  ", "ada@zuree.com");
        assert!(matches!(service.register(blank_name).await, Err(UserServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_ignores_case() {
        let service = setup_test_service().await;
        service.register(register_input("Ada", "ada@zuree.com")).await.unwrap();

        let result = service.register(register_input("Ada Again", "ADA@zuree.com")).await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_registration_closed_except_first_user() {
        let service = setup_test_service().await.with_registration(false);

        service.register(register_input("Admin", "admin@zuree.com")).await.expect("first user allowed");
        let result = service.register(register_input("Late", "late@zuree.com")).await;
        assert!(matches!(result, Err(UserServiceError::RegistrationClosed)));
    }

    #[tokio::test]
    async fn test_login_and_validate_session() {
        let service = setup_test_service().await;
        let user = service.register(register_input("Ada", "ada@zuree.com")).await.unwrap();

        let (session, logged_in) = service
            .login(LoginInput::new(" Ada@Zuree.com ", "password123"))
            .await
            .expect("Login should succeed");
        assert_eq!(logged_in.id, user.id);

        let validated = service.validate_session(&session.id).await.unwrap();
        assert_eq!(validated.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_generic() {
        let service = setup_test_service().await;
        service.register(register_input("Ada", "ada@zuree.com")).await.unwrap();

        let wrong = service.login(LoginInput::new("ada@zuree.com", "nope-nope")).await;
        let unknown = service.login(LoginInput::new("ghost@zuree.com", "password123")).await;

        match (wrong, unknown) {
            (
                Err(UserServiceError::AuthenticationError(a)),
                Err(UserServiceError::AuthenticationError(b)),
            ) => assert_eq!(a, b),
            other => panic!("unexpected results: {:?}", other),
        }

        let logs = service.login_logs(&ListParams::default()).await.unwrap();
        assert_eq!(logs.total, 2);
        assert!(logs.items.iter().all(|l| !l.success));
    }

    #[tokio::test]
    async fn test_login_rate_limited_after_five_failures() {
        let service = setup_test_service().await;
        service.register(register_input("Ada", "ada@zuree.com")).await.unwrap();

        for _ in 0..5 {
            let _ = service.login(LoginInput::new("ada@zuree.com", "wrong-password")).await;
        }

        let result = service.login(LoginInput::new("ada@zuree.com", "password123")).await;
        assert!(matches!(result, Err(UserServiceError::RateLimited { retry_after }) if retry_after > 0));
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let service = setup_test_service().await;
        service.register(register_input("Ada", "ada@zuree.com")).await.unwrap();
        let (session, _) = service.login(LoginInput::new("ada@zuree.com", "password123")).await.unwrap();

        service.logout(&session.id).await.unwrap();
        service.logout(&session.id).await.expect("logout is idempotent");
        assert!(service.validate_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_and_removed() {
        let service = setup_test_service().await.with_session_ttl(-1);
        service.register(register_input("Ada", "ada@zuree.com")).await.unwrap();
        let (session, _) = service.login(LoginInput::new("ada@zuree.com", "password123")).await.unwrap();

        assert!(service.validate_session(&session.id).await.unwrap().is_none());
        assert_eq!(service.cleanup_expired_sessions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_change_password() {
        let service = setup_test_service().await;
        let user = service.register(register_input("Ada", "ada@zuree.com")).await.unwrap();

        let wrong = service.change_password(&user, "not-current", "brand-new-pass").await;
        assert!(matches!(wrong, Err(UserServiceError::ValidationError(_))));

        service.change_password(&user, "password123", "brand-new-pass").await.unwrap();
        assert!(service.login(LoginInput::new("ada@zuree.com", "brand-new-pass")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_profile() {
        let service = setup_test_service().await;
        let user = service.register(register_input("Ada", "ada@zuree.com")).await.unwrap();

        let updated = service.update_profile(&user, "  Ada Lovelace ").await.unwrap();
        assert_eq!(updated.name, "Ada Lovelace");
        assert!(service.update_profile(&user, "").await.is_err());
    }

    #[tokio::test]
    async fn test_admin_cannot_demote_or_delete_self() {
        let service = setup_test_service().await;
        let admin = service.register(register_input("Admin", "admin@zuree.com")).await.unwrap();

        let demote = UpdateUserInput {
            role: Some(UserRole::Editor),
            status: None,
        };
        assert!(matches!(
            service.admin_update(&admin, admin.id, demote).await,
            Err(UserServiceError::ValidationError(_))
        ));

        let disable = UpdateUserInput {
            role: None,
            status: Some(UserStatus::Disabled),
        };
        assert!(matches!(
            service.admin_update(&admin, admin.id, disable).await,
            Err(UserServiceError::ValidationError(_))
        ));

        assert!(matches!(
            service.admin_delete(&admin, admin.id).await,
            Err(UserServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_update_revokes_sessions() {
        let service = setup_test_service().await;
        let admin = service.register(register_input("Admin", "admin@zuree.com")).await.unwrap();
        let editor = service.register(register_input("Ed", "ed@zuree.com")).await.unwrap();
        let (session, _) = service.login(LoginInput::new("ed@zuree.com", "password123")).await.unwrap();

        let promoted = service
            .admin_update(
                &admin,
                editor.id,
                UpdateUserInput {
                    role: Some(UserRole::Editor),
                    status: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(promoted.role, UserRole::Editor);
        assert!(service.validate_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disabled_user_cannot_log_in() {
        let service = setup_test_service().await;
        let admin = service.register(register_input("Admin", "admin@zuree.com")).await.unwrap();
        let user = service.register(register_input("Bola", "bola@zuree.com")).await.unwrap();

        service
            .admin_update(
                &admin,
                user.id,
                UpdateUserInput {
                    role: None,
                    status: Some(UserStatus::Disabled),
                },
            )
            .await
            .unwrap();

        let result = service.login(LoginInput::new("bola@zuree.com", "password123")).await;
        assert!(matches!(result, Err(UserServiceError::AuthenticationError(_))));
    }

    #[tokio::test]
    async fn test_admin_delete_missing_user() {
        let service = setup_test_service().await;
        let admin = service.register(register_input("Admin", "admin@zuree.com")).await.unwrap();

        assert!(matches!(
            service.admin_delete(&admin, 999).await,
            Err(UserServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_register_and_login_ignores_login_rate_limits() {
        let service = setup_test_service().await;
        let ip: IpAddr = "203.0.113.9".parse().unwrap();

        for i in 0..20 {
            let attempt = LoginInput {
                ip: Some(ip),
                ..LoginInput::new(format!("probe{}@zuree.com", i), "wrong-password")
            };
            let _ = service.login(attempt).await;
        }
        for _ in 0..5 {
            let _ = service.login(LoginInput::new("new@zuree.com", "wrong-password")).await;
        }

        let (session, user) = service
            .register_and_login(register_input("New", "new@zuree.com"), Some(ip), None)
            .await
            .expect("Registration should open a session");
        assert_eq!(session.user_id, user.id);
        assert!(service.validate_session(&session.id).await.unwrap().is_some());
    }

    /// Reports an empty table, as a registration racing another one sees it
    struct EmptyLookingUsers(Arc<dyn UserRepository>);

    #[async_trait::async_trait]
    impl UserRepository for EmptyLookingUsers {
        async fn create(&self, user: &User) -> anyhow::Result<User> {
            self.0.create(user).await
        }
        async fn get_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
            self.0.get_by_id(id).await
        }
        async fn get_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
            self.0.get_by_email(email).await
        }
        async fn update(&self, user: &User) -> anyhow::Result<User> {
            self.0.update(user).await
        }
        async fn delete(&self, id: i64) -> anyhow::Result<()> {
            self.0.delete(id).await
        }
        async fn count(&self) -> anyhow::Result<i64> {
            Ok(0)
        }
        async fn count_before(&self, id: i64) -> anyhow::Result<i64> {
            self.0.count_before(id).await
        }
        async fn count_by_role(&self, role: UserRole) -> anyhow::Result<i64> {
            self.0.count_by_role(role).await
        }
        async fn list(&self, params: &ListParams) -> anyhow::Result<(Vec<User>, i64)> {
            self.0.list(params).await
        }
    }

    /// Service whose first-user check always passes, plus the real repository
    async fn racing_service() -> (UserService, Arc<dyn UserRepository>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::boxed(pool.clone());
        let service = UserService::new(
            Arc::new(EmptyLookingUsers(users.clone())),
            SqlxSessionRepository::boxed(pool.clone()),
            SqlxLoginLogRepository::boxed(pool),
        );
        (service, users)
    }

    #[tokio::test]
    async fn test_concurrent_first_registration_keeps_one_admin() {
        let (service, users) = racing_service().await;
        let winner = service.register(register_input("Ada", "ada@zuree.com")).await.unwrap();
        let loser = service.register(register_input("Grace", "grace@zuree.com")).await.unwrap();

        assert_eq!(winner.role, UserRole::Admin);
        assert_eq!(loser.role, UserRole::User);
        assert_eq!(users.count_by_role(UserRole::Admin).await.unwrap(), 1);
        let stored = users.get_by_id(loser.id).await.unwrap().unwrap();
        assert_eq!(stored.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_concurrent_first_registration_respects_closed_registration() {
        let (service, users) = racing_service().await;
        let service = service.with_registration(false);
        service.register(register_input("Ada", "ada@zuree.com")).await.unwrap();

        let result = service.register(register_input("Grace", "grace@zuree.com")).await;
        assert!(matches!(result, Err(UserServiceError::RegistrationClosed)));
        assert!(users.get_by_email("grace@zuree.com").await.unwrap().is_none());
        assert_eq!(users.count().await.unwrap(), 1);
    }
}
