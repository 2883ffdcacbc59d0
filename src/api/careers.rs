//! Careers API endpoints
//!
//! Public:
//! - GET /api/careers/jobs - Open jobs (`department`, `location`, `employment_type`, `search`)
//! - GET /api/careers/jobs/{id} - One open job
//! - POST /api/careers/apply - Submit an application
//!
//! Admin (admin, hr):
//! - GET/POST /api/admin/jobs, GET/PUT/DELETE /api/admin/jobs/{id}
//! - GET /api/admin/applications (`job_id`, `status`)
//! - GET/DELETE /api/admin/applications/{id}, PUT /api/admin/applications/{id}/status

use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;

use crate::api::common::{
    default_page, default_page_size, default_per_page, ApiJson, ApiPath, ApiQuery,
};
use crate::api::middleware::AppState;
use crate::api::responses::{ApiResponse, ApiResult, CreatedResult};
use crate::models::{
    Application, ApplicationFilter, ApplicationStatus, CreateApplicationInput, CreateJobInput,
    EmploymentType, Job, JobFilter, JobStatus, ListParams, PagedResult,
    UpdateApplicationStatusInput, UpdateJobInput,
};

#[derive(Debug, Deserialize)]
pub struct JobQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub per_page: u32,
    pub status: Option<JobStatus>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub search: Option<String>,
}

impl JobQuery {
    fn filter(&self) -> JobFilter {
        JobFilter {
            status: self.status,
            department: self.department.clone(),
            location: self.location.clone(),
            employment_type: self.employment_type,
            search: self.search.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApplicationQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    pub job_id: Option<i64>,
    pub status: Option<ApplicationStatus>,
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_open_jobs))
        .route("/jobs/{id}", get(get_open_job))
        .route("/apply", post(apply))
}

pub fn admin_jobs_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_jobs).post(create_job))
        .route("/{id}", get(get_job).put(update_job).delete(delete_job))
}

pub fn admin_applications_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_applications))
        .route("/{id}", get(get_application).delete(delete_application))
        .route("/{id}/status", put(update_application_status))
}

/// GET /api/careers/jobs
async fn list_open_jobs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<JobQuery>,
) -> ApiResult<PagedResult<Job>> {
    let params = ListParams::new(query.page, query.per_page);
    let page = state
        .career_service
        .list_open_jobs(query.filter(), &params)
        .await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/careers/jobs/{id}
async fn get_open_job(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Job> {
    Ok(ApiResponse::ok(state.career_service.get_open_job(id).await?))
}

/// POST /api/careers/apply
async fn apply(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateApplicationInput>,
) -> CreatedResult<Application> {
    let application = state.career_service.apply(body).await?;
    Ok(ApiResponse::created(application))
}

/// GET /api/admin/jobs
async fn list_jobs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<JobQuery>,
) -> ApiResult<PagedResult<Job>> {
    let params = ListParams::new(query.page, query.per_page);
    let page = state
        .career_service
        .list_jobs(&query.filter(), &params)
        .await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/admin/jobs/{id}
async fn get_job(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Job> {
    Ok(ApiResponse::ok(state.career_service.get_job(id).await?))
}

/// POST /api/admin/jobs
async fn create_job(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateJobInput>,
) -> CreatedResult<Job> {
    Ok(ApiResponse::created(state.career_service.create_job(body).await?))
}

/// PUT /api/admin/jobs/{id}
async fn update_job(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateJobInput>,
) -> ApiResult<Job> {
    let job = state.career_service.update_job(id, body).await?;
    Ok(ApiResponse::with_message(job, "Job updated"))
}

/// DELETE /api/admin/jobs/{id}
async fn delete_job(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    state.career_service.delete_job(id).await?;
    Ok(ApiResponse::message("Job deleted"))
}

/// GET /api/admin/applications
async fn list_applications(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ApplicationQuery>,
) -> ApiResult<PagedResult<Application>> {
    let filter = ApplicationFilter {
        job_id: query.job_id,
        status: query.status,
    };
    let params = ListParams::new(query.page, query.per_page);
    let page = state
        .career_service
        .list_applications(&filter, &params)
        .await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/admin/applications/{id}
async fn get_application(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Application> {
    Ok(ApiResponse::ok(state.career_service.get_application(id).await?))
}

/// PUT /api/admin/applications/{id}/status
async fn update_application_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateApplicationStatusInput>,
) -> ApiResult<Application> {
    let application = state
        .career_service
        .update_application_status(id, body.status)
        .await?;
    Ok(ApiResponse::with_message(application, "Application status updated"))
}

/// DELETE /api/admin/applications/{id}
async fn delete_application(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    state.career_service.delete_application(id).await?;
    Ok(ApiResponse::message("Application deleted"))
}
