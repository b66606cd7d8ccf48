use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use taskboard_api::auth::{generate_jwt, Claims};
use taskboard_api::{app, AppState};

/// Router over a lazy pool: no connection is opened until a handler runs a
/// query, so request validation and auth rejection can be exercised without
/// a live database.
pub fn test_app() -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://postgres@localhost/taskboard_test")
        .expect("lazy pool");
    app(AppState { pool })
}

pub fn bearer_token() -> String {
    let claims = Claims::new(uuid::Uuid::new_v4(), "tester@example.com".to_string());
    generate_jwt(&claims).expect("token")
}

pub async fn send_json(
    router: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder.body(Body::from(body.to_string())).expect("request");
    router.oneshot(request).await.expect("response")
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub async fn assert_error(
    response: Response<Body>,
    status: StatusCode,
    message: &str,
) {
    assert_eq!(response.status(), status);
    let body = json_body(response).await;
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], message);
}
