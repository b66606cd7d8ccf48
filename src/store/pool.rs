use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::AppConfig;
use crate::store::error::StoreError;

/// Open the single process-wide connection pool. Called once at startup;
/// the pool is carried in application state and closed at shutdown, never
/// created lazily inside a request path.
pub async fn connect(config: &AppConfig) -> Result<PgPool, StoreError> {
    let url = std::env::var("DATABASE_URL").map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .connect(&url)
        .await?;

    info!(
        max_connections = config.database.max_connections,
        "database pool ready"
    );
    Ok(pool)
}

/// Ping the store; used by the health endpoint.
pub async fn health_check(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
