//! API middleware
//!
//! Contains:
//! - Shared application state
//! - The JSON error type every handler returns
//! - Authentication (session token validation)
//! - Authorization (role allow-lists)

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequestParts, Request, State,
    },
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::db::repositories::{
    SqlxApplicationRepository, SqlxBlogRepository, SqlxContactRepository, SqlxJobRepository,
    SqlxLoginLogRepository, SqlxServiceOfferingRepository, SqlxSessionRepository,
    SqlxTeamMemberRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::models::{User, UserRole};
use crate::services::{
    BlogService, CareerService, CatalogService, ContactNotifier, ContactService,
    DisabledNotifier, EmailService, ServiceError, TeamService, UserService, UserServiceError,
};

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub user_service: Arc<UserService>,
    pub blog_service: Arc<BlogService>,
    pub career_service: Arc<CareerService>,
    pub contact_service: Arc<ContactService>,
    pub catalog_service: Arc<CatalogService>,
    pub team_service: Arc<TeamService>,
    /// Read the client IP from forwarding headers
    pub trust_proxy: bool,
}

impl AppState {
    /// Wire repositories and services over `pool`.
    ///
    /// Fails when mail is configured but the SMTP transport cannot be built.
    pub fn new(pool: DynDatabasePool, config: &Config) -> anyhow::Result<Self> {
        let notifier: Arc<dyn ContactNotifier> = if config.mail.is_enabled() {
            tracing::info!("Contact notifications enabled");
            Arc::new(EmailService::from_config(&config.mail)?)
        } else {
            Arc::new(DisabledNotifier)
        };

        let user_service = UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            SqlxLoginLogRepository::boxed(pool.clone()),
        )
        .with_session_ttl(config.auth.session_ttl_hours)
        .with_registration(config.auth.allow_registration);

        Ok(Self {
            user_service: Arc::new(user_service),
            blog_service: Arc::new(BlogService::new(SqlxBlogRepository::boxed(pool.clone()))),
            career_service: Arc::new(CareerService::new(
                SqlxJobRepository::boxed(pool.clone()),
                SqlxApplicationRepository::boxed(pool.clone()),
            )),
            contact_service: Arc::new(ContactService::new(
                SqlxContactRepository::boxed(pool.clone()),
                notifier,
            )),
            catalog_service: Arc::new(CatalogService::new(
                SqlxServiceOfferingRepository::boxed(pool.clone()),
            )),
            team_service: Arc::new(TeamService::new(SqlxTeamMemberRepository::boxed(
                pool.clone(),
            ))),
            trust_proxy: config.server.trust_proxy,
            pool,
        })
    }
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Token of the session that authenticated the request
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Error response for API errors
///
/// Serialized as `{"success": false, "message": "...", "code": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    pub message: String,
    pub code: String,
    /// Seconds until a rate-limited client may retry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<i64>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            code: code.into(),
            retry_after: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn rate_limited(retry_after: i64) -> Self {
        Self {
            retry_after: Some(retry_after),
            ..Self::new(
                "RATE_LIMITED",
                format!("Too many attempts, try again in {} seconds", retry_after),
            )
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    /// Log the cause and hide it from the client
    fn internal(err: &anyhow::Error) -> Self {
        tracing::error!("Internal error: {:#}", err);
        Self::internal_error("Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            "RATE_LIMITED" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self.retry_after {
            Some(secs) => (status, [(header::RETRY_AFTER, secs.to_string())], Json(self)).into_response(),
            None => (status, Json(self)).into_response(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => Self::validation_error(msg),
            ServiceError::NotFound(entity) => Self::not_found(format!("{} not found", entity)),
            ServiceError::Conflict(msg) => Self::conflict(msg),
            ServiceError::Internal(e) => Self::internal(&e),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::AuthenticationError(msg) => Self::unauthorized(msg),
            UserServiceError::ValidationError(msg) => Self::validation_error(msg),
            UserServiceError::UserExists(msg) => Self::conflict(msg),
            UserServiceError::RegistrationClosed => Self::forbidden("Registration is closed"),
            UserServiceError::RateLimited { retry_after } => Self::rate_limited(retry_after),
            UserServiceError::NotFound => Self::not_found("User not found"),
            UserServiceError::InternalError(e) => Self::internal(&e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation_error(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation_error(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation_error(rejection.body_text())
    }
}

/// Extract session token from the `Authorization` header or the token cookie
fn extract_session_token(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                let token = token.trim();
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }

    let cookie_str = request.headers().get(header::COOKIE)?.to_str().ok()?;
    cookie_str
        .split(';')
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = state
        .user_service
        .validate_session(&token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    request.extensions_mut().insert(SessionToken(token));
    Ok(next.run(request).await)
}

/// Role allow-list middleware. Must run after [`require_auth`].
///
/// ```ignore
/// router.route_layer(from_fn_with_state(CAREER_ROLES, require_roles))
/// ```
pub async fn require_roles(
    State(roles): State<&'static [UserRole]>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.has_any_role(roles) {
        tracing::debug!(user_id = user.0.id, role = %user.0.role, "Role not allowed");
        return Err(ApiError::forbidden("You do not have access to this resource"));
    }

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionToken>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
