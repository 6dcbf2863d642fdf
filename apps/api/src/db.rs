use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const MAX_CONNECTIONS: u32 = 10;

/// Connection pool for the leads/activities database.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to the leads database...");

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await?;

    info!("Leads database pool ready (max {MAX_CONNECTIONS} connections)");
    Ok(pool)
}
