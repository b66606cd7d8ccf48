//! HTTP handlers: extract request parts, enforce required-field checks,
//! delegate to the entity services, and wrap results in the response
//! envelope.

pub mod auth;
pub mod comments;
pub mod projects;
pub mod tasks;
pub mod users;

use axum::extract::State;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::store::pool::health_check;
use crate::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    health_check(&state.pool).await.map_err(crate::error::ApiError::from)?;
    Ok(ApiResponse::success(json!({ "status": "ok" })))
}
