//! Blog API endpoints
//!
//! Public:
//! - GET /api/blogs - Published posts (`page`, `per_page`, `category`, `search`)
//! - GET /api/blogs/categories - Categories of published posts
//! - GET /api/blogs/{slug} - One published post
//!
//! Admin (admin, editor):
//! - GET/POST /api/admin/blogs
//! - GET/PUT/DELETE /api/admin/blogs/{id}

use axum::{
    extract::State,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::api::common::{
    default_page, default_page_size, default_per_page, ApiJson, ApiPath, ApiQuery,
};
use crate::api::middleware::{AppState, AuthenticatedUser};
use crate::api::responses::{ApiResponse, ApiResult, CreatedResult};
use crate::models::{
    BlogFilter, BlogPost, CreateBlogInput, ListParams, PagedResult, PostStatus, UpdateBlogInput,
};

#[derive(Debug, Deserialize)]
pub struct PublicBlogQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub per_page: u32,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminBlogQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    pub status: Option<PostStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_published))
        .route("/categories", get(list_categories))
        .route("/{slug}", get(get_published))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create_post))
        .route("/{id}", get(get_post).put(update_post).delete(delete_post))
}

/// GET /api/blogs
async fn list_published(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PublicBlogQuery>,
) -> ApiResult<PagedResult<BlogPost>> {
    let params = ListParams::new(query.page, query.per_page);
    let page = state
        .blog_service
        .list_published(query.category, query.search, &params)
        .await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/blogs/categories
async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(ApiResponse::ok(state.blog_service.categories().await?))
}

/// GET /api/blogs/{slug}
async fn get_published(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<BlogPost> {
    Ok(ApiResponse::ok(state.blog_service.get_published(&slug).await?))
}

/// GET /api/admin/blogs
async fn list_all(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AdminBlogQuery>,
) -> ApiResult<PagedResult<BlogPost>> {
    let filter = BlogFilter {
        status: query.status,
        category: query.category,
        search: query.search,
    };
    let params = ListParams::new(query.page, query.per_page);
    Ok(ApiResponse::ok(state.blog_service.list(&filter, &params).await?))
}

/// GET /api/admin/blogs/{id}
async fn get_post(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<BlogPost> {
    Ok(ApiResponse::ok(state.blog_service.get_by_id(id).await?))
}

/// POST /api/admin/blogs
async fn create_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(body): ApiJson<CreateBlogInput>,
) -> CreatedResult<BlogPost> {
    let post = state.blog_service.create(user.0.id, body).await?;
    Ok(ApiResponse::created(post))
}

/// PUT /api/admin/blogs/{id}
async fn update_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateBlogInput>,
) -> ApiResult<BlogPost> {
    let post = state.blog_service.update(id, body).await?;
    Ok(ApiResponse::with_message(post, "Blog post updated"))
}

/// DELETE /api/admin/blogs/{id}
async fn delete_post(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    state.blog_service.delete(id).await?;
    Ok(ApiResponse::message("Blog post deleted"))
}
