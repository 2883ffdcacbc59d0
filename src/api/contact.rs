//! Contact API endpoints
//!
//! - POST /api/contact - Public contact form
//! - GET /api/admin/contacts - Messages (`status`, pagination), admin only
//! - GET/DELETE /api/admin/contacts/{id}, PUT /api/admin/contacts/{id}/status

use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;

use crate::api::common::{default_page, default_per_page, ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::AppState;
use crate::api::responses::{ApiResponse, ApiResult, CreatedResult};
use crate::models::{
    ContactFilter, ContactMessage, ContactStatus, CreateContactInput, ListParams, PagedResult,
    UpdateContactStatusInput,
};

#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    pub status: Option<ContactStatus>,
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/", post(submit))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_messages))
        .route("/{id}", get(get_message).delete(delete_message))
        .route("/{id}/status", put(update_status))
}

/// POST /api/contact
async fn submit(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateContactInput>,
) -> CreatedResult<ContactMessage> {
    let message = state.contact_service.submit(body).await?;
    Ok(ApiResponse::created(message))
}

/// GET /api/admin/contacts
async fn list_messages(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ContactQuery>,
) -> ApiResult<PagedResult<ContactMessage>> {
    let filter = ContactFilter {
        status: query.status,
    };
    let params = ListParams::new(query.page, query.per_page);
    Ok(ApiResponse::ok(state.contact_service.list(&filter, &params).await?))
}

/// GET /api/admin/contacts/{id}
///
/// Opening a new message marks it read.
async fn get_message(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ContactMessage> {
    Ok(ApiResponse::ok(state.contact_service.open(id).await?))
}

/// PUT /api/admin/contacts/{id}/status
async fn update_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateContactStatusInput>,
) -> ApiResult<ContactMessage> {
    let message = state.contact_service.update_status(id, body.status).await?;
    Ok(ApiResponse::with_message(message, "Status updated"))
}

/// DELETE /api/admin/contacts/{id}
async fn delete_message(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    state.contact_service.delete(id).await?;
    Ok(ApiResponse::message("Message deleted"))
}
