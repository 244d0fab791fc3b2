use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool sized for `workers`
/// concurrent batch documents plus request traffic.
pub async fn create_pool(database_url: &str, workers: usize) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let max_connections = u32::try_from(workers).unwrap_or(u32::MAX).saturating_add(6).max(10);
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!(max_connections, "PostgreSQL connection pool established");
    Ok(pool)
}
