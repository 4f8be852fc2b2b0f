use super::migrations::DatabaseMigrations;
use crate::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Row};
use tracing::info;

/// Owns the Postgres pool shared by every repository
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Open a pool sized and tuned from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let mut options: PgConnectOptions = config.url.parse()?;
        if config.statement_timeout_ms > 0 {
            options = options.options([(
                "statement_timeout",
                config.statement_timeout_ms.to_string(),
            )]);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_with(options)
            .await?;

        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Database pool established"
        );

        Ok(Self { pool })
    }

    /// Connect and, when `run_migrations` is set, apply pending migrations
    pub async fn bootstrap(config: &DatabaseConfig) -> crate::error::Result<Self> {
        let connection = Self::connect(config).await?;
        if config.run_migrations {
            DatabaseMigrations::run_all(&connection.pool).await?;
        }
        Ok(connection)
    }

    /// Wrap an existing pool (tests, embedding applications)
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 as health")
            .fetch_one(&self.pool)
            .await?;

        let health: i32 = row.get("health");
        Ok(health == 1)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
