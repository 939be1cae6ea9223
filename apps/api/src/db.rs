use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates a lazy PostgreSQL connection pool. No connection is opened until
/// the first query, so services that never touch the store start cleanly
/// without a reachable database.
pub fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_lazy(database_url)?;

    info!("PostgreSQL pool initialized (lazy)");
    Ok(pool)
}
