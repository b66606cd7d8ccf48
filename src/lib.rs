pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod services;
pub mod store;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state: the single process-wide connection pool.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

/// Build the full router. Everything under /api/v1 except the auth
/// endpoints sits behind the bearer-token middleware.
pub fn app(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/login", post(handlers::auth::login));

    let protected = Router::new()
        .route(
            "/api/v1/users",
            get(handlers::users::list),
        )
        .route(
            "/api/v1/users/:userId",
            get(handlers::users::get)
                .patch(handlers::users::update)
                .delete(handlers::users::delete),
        )
        .route(
            "/api/v1/projects",
            get(handlers::projects::list).post(handlers::projects::create),
        )
        .route(
            "/api/v1/projects/:projectId",
            get(handlers::projects::get)
                .patch(handlers::projects::update)
                .delete(handlers::projects::delete),
        )
        .route(
            "/api/v1/projects/:projectId/members",
            post(handlers::projects::add_member).delete(handlers::projects::remove_member),
        )
        .route(
            "/api/v1/tasks",
            get(handlers::tasks::list).post(handlers::tasks::create),
        )
        .route(
            "/api/v1/tasks/project/:projectId",
            get(handlers::tasks::list_by_project),
        )
        .route(
            "/api/v1/tasks/:taskId",
            get(handlers::tasks::get)
                .patch(handlers::tasks::update)
                .delete(handlers::tasks::delete),
        )
        .route(
            "/api/v1/comments",
            get(handlers::comments::list).post(handlers::comments::create),
        )
        .route(
            "/api/v1/comments/:commentId",
            get(handlers::comments::get)
                .patch(handlers::comments::update)
                .delete(handlers::comments::delete),
        )
        .route_layer(from_fn(middleware::jwt_auth_middleware));

    public
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
