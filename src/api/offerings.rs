//! Service offering API endpoints
//!
//! - GET /api/services - Active offerings in display order
//! - GET /api/services/{slug} - One active offering
//! - GET/POST /api/admin/services, GET/PUT/DELETE /api/admin/services/{id} (admin, editor)

use axum::{extract::State, routing::get, Router};

use crate::api::common::{ApiJson, ApiPath};
use crate::api::middleware::AppState;
use crate::api::responses::{ApiResponse, ApiResult, CreatedResult};
use crate::models::{CreateServiceInput, ServiceOffering, UpdateServiceInput};

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_active))
        .route("/{slug}", get(get_active))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create_offering))
        .route(
            "/{id}",
            get(get_offering).put(update_offering).delete(delete_offering),
        )
}

async fn list_active(State(state): State<AppState>) -> ApiResult<Vec<ServiceOffering>> {
    Ok(ApiResponse::ok(state.catalog_service.list(true).await?))
}

async fn get_active(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<ServiceOffering> {
    Ok(ApiResponse::ok(state.catalog_service.get_active(&slug).await?))
}

async fn list_all(State(state): State<AppState>) -> ApiResult<Vec<ServiceOffering>> {
    Ok(ApiResponse::ok(state.catalog_service.list(false).await?))
}

async fn get_offering(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ServiceOffering> {
    Ok(ApiResponse::ok(state.catalog_service.get_by_id(id).await?))
}

async fn create_offering(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateServiceInput>,
) -> CreatedResult<ServiceOffering> {
    Ok(ApiResponse::created(state.catalog_service.create(body).await?))
}

async fn update_offering(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateServiceInput>,
) -> ApiResult<ServiceOffering> {
    let offering = state.catalog_service.update(id, body).await?;
    Ok(ApiResponse::with_message(offering, "Service updated"))
}

async fn delete_offering(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    state.catalog_service.delete(id).await?;
    Ok(ApiResponse::message("Service deleted"))
}
