//! Health check
//!
//! GET /api/health - Pings the database

use axum::{extract::State, routing::get, Router};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{ApiResponse, ApiResult};
use crate::config::DatabaseDriver;

/// App version constant - update when releasing
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> ApiResult<HealthResponse> {
    if let Err(e) = state.pool.ping().await {
        tracing::error!("Health check failed: {:#}", e);
        return Err(ApiError::internal_error("Database unavailable"));
    }

    let database = match state.pool.driver() {
        DatabaseDriver::Sqlite => "sqlite",
        DatabaseDriver::Mysql => "mysql",
    };

    Ok(ApiResponse::ok(HealthResponse {
        status: "ok",
        database,
        version: APP_VERSION,
    }))
}
