//! Admin API endpoints
//!
//! - GET /api/admin/dashboard - Content counts (admin, editor, hr)
//! - GET /api/admin/users - Accounts (admin)
//! - PUT /api/admin/users/{id} - Change role or status (admin)
//! - DELETE /api/admin/users/{id} - Delete an account (admin)
//! - GET /api/admin/login-logs - Recent login attempts (admin)

use axum::{
    extract::State,
    routing::{get, put},
    Router,
};
use serde::Serialize;

use crate::api::common::{AdminPaginationQuery, ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::{AppState, AuthenticatedUser};
use crate::api::responses::{ApiResponse, ApiResult};
use crate::models::{
    ApplicationFilter, ApplicationStatus, BlogFilter, ContactFilter, ContactStatus, JobFilter,
    JobStatus, LoginLog, PagedResult, UpdateUserInput, User,
};

/// Response for dashboard stats
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_blogs: i64,
    pub published_blogs: i64,
    pub total_jobs: i64,
    pub open_jobs: i64,
    pub total_applications: i64,
    pub pending_applications: i64,
    pub total_contacts: i64,
    pub new_contacts: i64,
    pub total_services: i64,
    pub total_team_members: i64,
    pub total_users: i64,
}

pub fn dashboard_router() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

pub fn users_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", put(update_user).delete(delete_user))
        .route("/login-logs", get(list_login_logs))
}

/// GET /api/admin/dashboard
async fn get_dashboard(State(state): State<AppState>) -> ApiResult<DashboardResponse> {
    let blogs = &state.blog_service;
    let careers = &state.career_service;
    let contacts = &state.contact_service;

    let stats = DashboardResponse {
        total_blogs: blogs.count(&BlogFilter::default()).await?,
        published_blogs: blogs.count(&BlogFilter::published()).await?,
        total_jobs: careers.count_jobs(&JobFilter::default()).await?,
        open_jobs: careers
            .count_jobs(&JobFilter {
                status: Some(JobStatus::Open),
                ..Default::default()
            })
            .await?,
        total_applications: careers.count_applications(&ApplicationFilter::default()).await?,
        pending_applications: careers
            .count_applications(&ApplicationFilter {
                status: Some(ApplicationStatus::Pending),
                ..Default::default()
            })
            .await?,
        total_contacts: contacts.count(&ContactFilter::default()).await?,
        new_contacts: contacts
            .count(&ContactFilter {
                status: Some(ContactStatus::New),
            })
            .await?,
        total_services: state.catalog_service.count().await?,
        total_team_members: state.team_service.count().await?,
        total_users: state.user_service.count().await?,
    };

    Ok(ApiResponse::ok(stats))
}

/// GET /api/admin/users
async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AdminPaginationQuery>,
) -> ApiResult<PagedResult<User>> {
    Ok(ApiResponse::ok(state.user_service.list(&query.params()).await?))
}

/// PUT /api/admin/users/{id}
async fn update_user(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateUserInput>,
) -> ApiResult<User> {
    let user = state.user_service.admin_update(&admin.0, id, body).await?;
    Ok(ApiResponse::with_message(user, "User updated"))
}

/// DELETE /api/admin/users/{id}
async fn delete_user(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    state.user_service.admin_delete(&admin.0, id).await?;
    Ok(ApiResponse::message("User deleted"))
}

/// GET /api/admin/login-logs
async fn list_login_logs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AdminPaginationQuery>,
) -> ApiResult<PagedResult<LoginLog>> {
    Ok(ApiResponse::ok(state.user_service.login_logs(&query.params()).await?))
}
