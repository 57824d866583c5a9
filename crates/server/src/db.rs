use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

/// Create a PostgreSQL connection pool and run migrations.
/// Returns None if PostgreSQL is not configured or not reachable.
pub async fn init_pg_pool(config: &coverdesk_core::config::PostgresConfig) -> Option<PgPool> {
    if !config.is_configured() {
        warn!("PG_URL / PG_USERNAME not configured, using in-memory stores");
        return None;
    }

    let pool = match PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            warn!("Failed to connect to PostgreSQL: {}, using in-memory stores", e);
            return None;
        }
    };
    info!("PostgreSQL connected: {}", config.host);

    match sqlx::migrate!("../../migrations").run(&pool).await {
        Ok(_) => {
            info!("Database migrations applied successfully");
            Some(pool)
        }
        Err(e) => {
            warn!("Failed to run migrations: {}, using in-memory stores", e);
            None
        }
    }
}
