//! Connection pool management for the PostgreSQL record store.

use std::time::Duration;

use sqlx_core::pool::PoolOptions;
use sqlx_postgres::{PgPool, Postgres};
use tracing::{debug, info, instrument};

use crate::config::PostgresConfig;
use crate::error::{PostgresError, Result};

/// Type alias for PostgreSQL pool options.
pub type PgPoolOptions = PoolOptions<Postgres>;

/// Translates the store configuration into pool options.
pub fn pool_options(config: &PostgresConfig) -> Result<PgPoolOptions> {
    if config.pool_size == 0 {
        return Err(PostgresError::config("pool_size must be at least 1"));
    }

    // A quarter of the pool stays warm unless configured otherwise.
    let warm = config
        .min_connections
        .unwrap_or(config.pool_size / 4)
        .clamp(1, config.pool_size);

    let options = PgPoolOptions::new()
        .max_connections(config.pool_size)
        .min_connections(warm)
        .acquire_timeout(Duration::from_millis(config.connect_timeout_ms))
        .idle_timeout(config.idle_timeout_ms.map(Duration::from_millis))
        .max_lifetime(config.max_lifetime_secs.map(Duration::from_secs))
        .test_before_acquire(false);

    Ok(options)
}

/// Opens the pool and checks that the server answers before handing it out.
#[instrument(skip(config), fields(url = %mask_password(&config.url)))]
pub async fn create_pool(config: &PostgresConfig) -> Result<PgPool> {
    let options = pool_options(config)?;

    info!(
        max_connections = options.get_max_connections(),
        min_connections = options.get_min_connections(),
        acquire_timeout_ms = config.connect_timeout_ms,
        "Opening PostgreSQL pool"
    );

    let pool = options.connect(&config.url).await?;
    ping(&pool).await?;
    Ok(pool)
}

/// Round-trips a trivial statement to prove the server is reachable.
#[instrument(skip(pool))]
pub async fn ping(pool: &PgPool) -> Result<()> {
    let answer: i32 = sqlx_core::query_scalar::query_scalar("SELECT 1")
        .fetch_one(pool)
        .await?;

    if answer != 1 {
        return Err(PostgresError::Schema(format!(
            "unexpected reply to liveness check: {answer}"
        )));
    }

    debug!(size = pool.size(), "PostgreSQL answered liveness check");
    Ok(())
}

/// Masks the password in a database URL for logging.
pub fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@')
        && let Some(colon_pos) = url[..at_pos].rfind(':')
    {
        let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
        if colon_pos > scheme_end {
            return format!("{}:****{}", &url[..colon_pos], &url[at_pos..]);
        }
    }
    url.to_string()
}
