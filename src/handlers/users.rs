use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use crate::middleware::{ApiResponse, ApiResult};
use crate::query::Page;
use crate::services::user::{UserListParams, UserUpdate};
use crate::services::UserService;
use crate::store::models::User;
use crate::AppState;

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> ApiResult<Page<User>> {
    let page = UserService::new(state.pool.clone()).list(&params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/v1/users/:userId
pub async fn get(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> ApiResult<User> {
    let user = UserService::new(state.pool.clone()).get(user_id).await?;
    Ok(ApiResponse::success(user))
}

/// PATCH /api/v1/users/:userId
pub async fn update(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UserUpdate>,
) -> ApiResult<User> {
    let user = UserService::new(state.pool.clone())
        .update(user_id, body)
        .await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/v1/users/:userId
pub async fn delete(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> ApiResult<User> {
    let user = UserService::new(state.pool.clone()).delete(user_id).await?;
    Ok(ApiResponse::success(user))
}
