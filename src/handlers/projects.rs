use axum::extract::{Extension, Json, Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::query::Page;
use crate::services::project::{ProjectListParams, ProjectUpdate};
use crate::services::{parse_uuid, ProjectService};
use crate::store::models::{Project, ProjectView};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProjectBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub members: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberBody {
    pub user_id: Option<String>,
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateProjectBody>,
) -> ApiResult<ProjectView> {
    let (name, description) = match (body.name, body.description) {
        (Some(n), Some(d)) if !n.is_empty() && !d.is_empty() => (n, d),
        _ => {
            return Err(ApiError::bad_request(
                "Name and description are required fields",
            ))
        }
    };
    let members = body
        .members
        .unwrap_or_default()
        .iter()
        .map(|raw| parse_uuid(raw, "member"))
        .collect::<Result<Vec<Uuid>, _>>()?;

    let project = ProjectService::new(state.pool.clone())
        .create(auth.user_id, name, description, members)
        .await?;
    Ok(ApiResponse::created(project))
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<ProjectListParams>,
) -> ApiResult<Page<ProjectView>> {
    let page = ProjectService::new(state.pool.clone())
        .list_for_user(auth.user_id, &params)
        .await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/v1/projects/:projectId
pub async fn get(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<ProjectView> {
    let project = ProjectService::new(state.pool.clone())
        .get(project_id)
        .await?;
    Ok(ApiResponse::success(project))
}

/// PATCH /api/v1/projects/:projectId
pub async fn update(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<ProjectUpdate>,
) -> ApiResult<ProjectView> {
    let project = ProjectService::new(state.pool.clone())
        .update(project_id, body)
        .await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/v1/projects/:projectId
pub async fn delete(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Project> {
    let project = ProjectService::new(state.pool.clone())
        .delete(project_id)
        .await?;
    Ok(ApiResponse::success(project))
}

/// POST /api/v1/projects/:projectId/members
pub async fn add_member(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<MemberBody>,
) -> ApiResult<ProjectView> {
    let user_id = require_member_id(body)?;
    let project = ProjectService::new(state.pool.clone())
        .add_member(project_id, user_id)
        .await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/v1/projects/:projectId/members
pub async fn remove_member(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<MemberBody>,
) -> ApiResult<ProjectView> {
    let user_id = require_member_id(body)?;
    let project = ProjectService::new(state.pool.clone())
        .remove_member(project_id, user_id)
        .await?;
    Ok(ApiResponse::success(project))
}

fn require_member_id(body: MemberBody) -> Result<Uuid, ApiError> {
    match body.user_id {
        Some(raw) if !raw.is_empty() => parse_uuid(&raw, "user"),
        _ => Err(ApiError::bad_request("User ID is required")),
    }
}
