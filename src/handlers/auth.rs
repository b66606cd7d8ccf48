use axum::extract::{Json, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{generate_jwt, Claims};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> ApiResult<Value> {
    let (email, password) = match (body.email, body.password) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
        _ => return Err(ApiError::bad_request("Email and password are required")),
    };
    let name = body.name.unwrap_or_default();

    let service = UserService::new(state.pool.clone());
    if service.find_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("User already exists with this email"));
    }

    let hash = hash_password(&password)?;
    let user = service.create(name, email, hash).await?;

    let token = generate_jwt(&Claims::new(user.id, user.email.clone()))?;
    Ok(ApiResponse::created(json!({
        "user": user,
        "accessToken": token,
    })))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> ApiResult<Value> {
    let (email, password) = match (body.email, body.password) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
        _ => return Err(ApiError::bad_request("Email and password are required")),
    };

    let service = UserService::new(state.pool.clone());
    let user = service
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !verify_password(&password, &user.password)? {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = generate_jwt(&Claims::new(user.id, user.email.clone()))?;
    Ok(ApiResponse::success(json!({
        "user": user,
        "accessToken": token,
    })))
}
