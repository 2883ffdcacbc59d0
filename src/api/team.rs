//! Team API endpoints
//!
//! - GET /api/team - Active members in display order
//! - GET/POST /api/admin/team, GET/PUT/DELETE /api/admin/team/{id} (admin, editor)

use axum::{extract::State, routing::get, Router};

use crate::api::common::{ApiJson, ApiPath};
use crate::api::middleware::AppState;
use crate::api::responses::{ApiResponse, ApiResult, CreatedResult};
use crate::models::{CreateTeamMemberInput, TeamMember, UpdateTeamMemberInput};

pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list_active))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create_member))
        .route("/{id}", get(get_member).put(update_member).delete(delete_member))
}

async fn list_active(State(state): State<AppState>) -> ApiResult<Vec<TeamMember>> {
    Ok(ApiResponse::ok(state.team_service.list(true).await?))
}

async fn list_all(State(state): State<AppState>) -> ApiResult<Vec<TeamMember>> {
    Ok(ApiResponse::ok(state.team_service.list(false).await?))
}

async fn get_member(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<TeamMember> {
    Ok(ApiResponse::ok(state.team_service.get_by_id(id).await?))
}

async fn create_member(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateTeamMemberInput>,
) -> CreatedResult<TeamMember> {
    Ok(ApiResponse::created(state.team_service.create(body).await?))
}

async fn update_member(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateTeamMemberInput>,
) -> ApiResult<TeamMember> {
    let member = state.team_service.update(id, body).await?;
    Ok(ApiResponse::with_message(member, "Team member updated"))
}

async fn delete_member(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    state.team_service.delete(id).await?;
    Ok(ApiResponse::message("Team member deleted"))
}
