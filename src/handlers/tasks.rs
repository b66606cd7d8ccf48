use axum::extract::{Extension, Json, Path, Query, State};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::query::{parse_timestamp, Page};
use crate::services::task::{ProjectTaskParams, TaskListParams, TaskUpdate};
use crate::services::{parse_uuid, TaskService};
use crate::store::models::{Task, TaskView};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub project: Option<String>,
    pub assign_to: Option<String>,
}

/// POST /api/v1/tasks
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateTaskBody>,
) -> ApiResult<TaskView> {
    let (title, description, project) = match (body.title, body.description, body.project) {
        (Some(t), Some(d), Some(p)) if !t.is_empty() && !d.is_empty() && !p.is_empty() => {
            (t, d, p)
        }
        _ => {
            return Err(ApiError::bad_request(
                "Title, description, and project are required fields",
            ))
        }
    };
    let project = parse_uuid(&project, "project")?;
    let assign_to = body
        .assign_to
        .as_deref()
        .map(|raw| parse_uuid(raw, "assignTo"))
        .transpose()?;
    let due_date = parse_due_date(body.due_date.as_deref())?;

    let task = TaskService::new(state.pool.clone())
        .create(
            auth.user_id,
            title,
            description,
            body.status,
            body.priority,
            due_date,
            project,
            assign_to,
        )
        .await?;
    Ok(ApiResponse::created(task))
}

/// GET /api/v1/tasks
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> ApiResult<Vec<TaskView>> {
    let tasks = TaskService::new(state.pool.clone()).list(&params).await?;
    Ok(ApiResponse::success(tasks))
}

/// GET /api/v1/tasks/:taskId
pub async fn get(State(state): State<AppState>, Path(task_id): Path<Uuid>) -> ApiResult<TaskView> {
    let task = TaskService::new(state.pool.clone()).get(task_id).await?;
    Ok(ApiResponse::success(task))
}

/// GET /api/v1/tasks/project/:projectId
pub async fn list_by_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(params): Query<ProjectTaskParams>,
) -> ApiResult<Page<TaskView>> {
    let page = TaskService::new(state.pool.clone())
        .list_by_project(project_id, &params)
        .await?;
    Ok(ApiResponse::success(page))
}

/// PATCH /api/v1/tasks/:taskId
pub async fn update(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(body): Json<TaskUpdate>,
) -> ApiResult<TaskView> {
    let task = TaskService::new(state.pool.clone())
        .update(task_id, body)
        .await?;
    Ok(ApiResponse::success(task))
}

/// DELETE /api/v1/tasks/:taskId
pub async fn delete(State(state): State<AppState>, Path(task_id): Path<Uuid>) -> ApiResult<Task> {
    let task = TaskService::new(state.pool.clone()).delete(task_id).await?;
    Ok(ApiResponse::success(task))
}

fn parse_due_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    raw.map(|r| parse_timestamp(r).ok_or_else(|| ApiError::bad_request("Invalid dueDate value")))
        .transpose()
}
