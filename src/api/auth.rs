//! Authentication API endpoints
//!
//! - POST /api/auth/register - Register (first user becomes admin)
//! - POST /api/auth/login - Log in, returns a bearer token
//! - POST /api/auth/logout - Delete the current session
//! - GET /api/auth/me - Current user
//! - PUT /api/auth/profile - Change display name
//! - PUT /api/auth/password - Change password

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::common::{ApiJson, ClientInfo};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, SessionToken, TOKEN_COOKIE};
use crate::api::responses::{ApiResponse, ApiResult};
use crate::models::{CreateUserInput, Session, User};
use crate::services::LoginInput;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Build protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
        .route("/profile", put(update_profile))
        .route("/password", put(change_password))
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// POST /api/auth/register
///
/// Creates the account and logs it in.
async fn register(
    State(state): State<AppState>,
    client: ClientInfo,
    ApiJson(body): ApiJson<CreateUserInput>,
) -> Result<impl IntoResponse, ApiError> {
    let (session, user) = state
        .user_service
        .register_and_login(body, Some(client.ip), client.user_agent)
        .await?;

    Ok((
        StatusCode::CREATED,
        session_cookie(&session),
        ApiResponse::with_message(auth_response(session, user), "Registration successful"),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = LoginInput {
        ip: Some(client.ip),
        user_agent: client.user_agent,
        ..LoginInput::new(body.email, body.password)
    };
    let (session, user) = state.user_service.login(input).await?;

    Ok((
        session_cookie(&session),
        ApiResponse::with_message(auth_response(session, user), "Login successful"),
    ))
}

/// POST /api/auth/logout
async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<impl IntoResponse, ApiError> {
    state.user_service.logout(&token).await?;

    let clear_cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", TOKEN_COOKIE);
    let mut response_headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&clear_cookie) {
        response_headers.insert(header::SET_COOKIE, value);
    }

    Ok((response_headers, ApiResponse::message("Logged out")))
}

/// GET /api/auth/me
async fn get_current_user(user: AuthenticatedUser) -> ApiResult<User> {
    Ok(ApiResponse::ok(user.0))
}

/// PUT /api/auth/profile
async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> ApiResult<User> {
    let updated = state.user_service.update_profile(&user.0, &body.name).await?;
    Ok(ApiResponse::with_message(updated, "Profile updated"))
}

/// PUT /api/auth/password
async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> ApiResult<()> {
    state
        .user_service
        .change_password(&user.0, &body.current_password, &body.new_password)
        .await?;
    Ok(ApiResponse::message("Password changed"))
}

fn auth_response(session: Session, user: User) -> AuthResponse {
    AuthResponse {
        user,
        token: session.id,
        expires_at: session.expires_at,
    }
}

/// HttpOnly cookie mirroring the bearer token, for browser clients
fn session_cookie(session: &Session) -> HeaderMap {
    let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        TOKEN_COOKIE, session.id, max_age
    );

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
    headers
}
