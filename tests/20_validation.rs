//! Required-field validation on the write endpoints. These requests carry a
//! valid bearer token but fail validation before any store operation.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{assert_error, bearer_token, send_json, test_app};

#[tokio::test]
async fn project_creation_requires_name_and_description() {
    let token = bearer_token();
    let response = send_json(
        test_app(),
        "POST",
        "/api/v1/projects",
        Some(&token),
        json!({ "name": "Apollo" }),
    )
    .await;
    assert_error(
        response,
        StatusCode::BAD_REQUEST,
        "Name and description are required fields",
    )
    .await;
}

#[tokio::test]
async fn task_creation_requires_title_description_and_project() {
    let token = bearer_token();
    let response = send_json(
        test_app(),
        "POST",
        "/api/v1/tasks",
        Some(&token),
        json!({ "title": "Ship it", "description": "" }),
    )
    .await;
    assert_error(
        response,
        StatusCode::BAD_REQUEST,
        "Title, description, and project are required fields",
    )
    .await;
}

#[tokio::test]
async fn comment_creation_requires_content_and_task() {
    let token = bearer_token();
    let response = send_json(
        test_app(),
        "POST",
        "/api/v1/comments",
        Some(&token),
        json!({ "content": "looks good" }),
    )
    .await;
    assert_error(
        response,
        StatusCode::BAD_REQUEST,
        "Content and taskId are required fields",
    )
    .await;
}

#[tokio::test]
async fn member_changes_require_a_user_id() {
    let token = bearer_token();
    let uri = format!("/api/v1/projects/{}/members", uuid::Uuid::new_v4());

    let response = send_json(test_app(), "POST", &uri, Some(&token), json!({})).await;
    assert_error(response, StatusCode::BAD_REQUEST, "User ID is required").await;

    let response = send_json(test_app(), "DELETE", &uri, Some(&token), json!({})).await;
    assert_error(response, StatusCode::BAD_REQUEST, "User ID is required").await;
}

#[tokio::test]
async fn malformed_task_filter_ids_are_rejected() {
    let token = bearer_token();
    let response = send_json(
        test_app(),
        "GET",
        "/api/v1/tasks?assignTo=not-a-uuid",
        Some(&token),
        json!({}),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "Invalid assignTo id").await;
}
