//! Shared API response types
//!
//! Every successful response is wrapped in the same envelope:
//! `{"success": true, "data": ..., "message": "..."}`. Paginated lists put
//! a [`PagedResult`](crate::models::PagedResult) in `data`.

use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::api::middleware::ApiError;

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result type returned by most handlers
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Result type for handlers that create a resource
pub type CreatedResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
        })
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        })
    }

    /// 201 Created with the new resource
    pub fn created(data: T) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Self::ok(data))
    }
}

impl ApiResponse<()> {
    /// Envelope with a message and no data, e.g. after a delete
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            message: Some(message.into()),
        })
    }
}
