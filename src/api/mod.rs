//! API layer - HTTP handlers and routing
//!
//! Everything is served under `/api`:
//! - Public site endpoints (blogs, careers, contact, services, team, health)
//! - Auth endpoints (register, login, logout, profile)
//! - Admin endpoints, each area behind a role allow-list

pub mod admin;
pub mod auth;
pub mod blogs;
pub mod careers;
pub mod common;
pub mod contact;
pub mod health;
pub mod middleware;
pub mod offerings;
pub mod responses;
pub mod team;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::models::UserRole;

pub use middleware::{ApiError, AppState, AuthenticatedUser};
pub use responses::{ApiResponse, ApiResult};

/// Blogs, services and team
pub const CONTENT_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::Editor];
/// Jobs and applications
pub const CAREER_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::Hr];
/// Contact messages, users and login logs
pub const ADMIN_ROLES: &[UserRole] = &[UserRole::Admin];
/// Dashboard
pub const STAFF_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::Editor, UserRole::Hr];

fn guarded(router: Router<AppState>, roles: &'static [UserRole]) -> Router<AppState> {
    router.route_layer(axum_middleware::from_fn_with_state(
        roles,
        middleware::require_roles,
    ))
}

/// Build the `/api` router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    let content_routes = guarded(
        Router::new()
            .nest("/admin/blogs", blogs::admin_router())
            .nest("/admin/services", offerings::admin_router())
            .nest("/admin/team", team::admin_router()),
        CONTENT_ROLES,
    );

    let career_routes = guarded(
        Router::new()
            .nest("/admin/jobs", careers::admin_jobs_router())
            .nest("/admin/applications", careers::admin_applications_router()),
        CAREER_ROLES,
    );

    let admin_routes = guarded(
        Router::new()
            .nest("/admin/contacts", contact::admin_router())
            .nest("/admin", admin::users_router()),
        ADMIN_ROLES,
    );

    let staff_routes = guarded(Router::new().nest("/admin", admin::dashboard_router()), STAFF_ROLES);

    // Every route above needs a session; the role guards run after this layer
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .merge(content_routes)
        .merge(career_routes)
        .merge(admin_routes)
        .merge(staff_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    Router::new()
        .merge(health::router())
        .nest("/auth", auth::public_router())
        .nest("/blogs", blogs::public_router())
        .nest("/careers", careers::public_router())
        .nest("/contact", contact::public_router())
        .nest("/services", offerings::public_router())
        .nest("/team", team::public_router())
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin).allow_credentials(true),
        Err(_) => {
            tracing::warn!("Invalid CORS origin {:?}, allowing any origin", cors_origin);
            cors.allow_origin(Any)
        }
    };

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
