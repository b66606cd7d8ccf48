use axum::extract::{Extension, Json, Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::query::Page;
use crate::services::comment::{CommentListParams, CommentUpdate};
use crate::services::{parse_uuid, CommentService};
use crate::store::models::{Comment, CommentView};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentBody {
    pub content: Option<String>,
    pub task_id: Option<String>,
}

/// POST /api/v1/comments
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateCommentBody>,
) -> ApiResult<CommentView> {
    let (content, task_id) = match (body.content, body.task_id) {
        (Some(c), Some(t)) if !c.is_empty() && !t.is_empty() => (c, t),
        _ => {
            return Err(ApiError::bad_request(
                "Content and taskId are required fields",
            ))
        }
    };
    let task_id = parse_uuid(&task_id, "task")?;

    let comment = CommentService::new(state.pool.clone())
        .create(auth.user_id, task_id, content)
        .await?;
    Ok(ApiResponse::created(comment))
}

/// GET /api/v1/comments
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CommentListParams>,
) -> ApiResult<Page<CommentView>> {
    let page = CommentService::new(state.pool.clone())
        .list(&params)
        .await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/v1/comments/:commentId
pub async fn get(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> ApiResult<CommentView> {
    let comment = CommentService::new(state.pool.clone())
        .get(comment_id)
        .await?;
    Ok(ApiResponse::success(comment))
}

/// PATCH /api/v1/comments/:commentId
pub async fn update(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    Json(body): Json<CommentUpdate>,
) -> ApiResult<CommentView> {
    let comment = CommentService::new(state.pool.clone())
        .update(comment_id, body)
        .await?;
    Ok(ApiResponse::success(comment))
}

/// DELETE /api/v1/comments/:commentId
pub async fn delete(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> ApiResult<Comment> {
    let comment = CommentService::new(state.pool.clone())
        .delete(comment_id)
        .await?;
    Ok(ApiResponse::success(comment))
}
