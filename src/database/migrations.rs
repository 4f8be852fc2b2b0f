//! # Database Migrations
//!
//! Schema migrations embedded at compile time from `migrations/`, named
//! `YYYYMMDDHHMMSS_description.sql`. Applying them is idempotent: sqlx tracks
//! applied versions in `_sqlx_migrations` and takes an advisory lock so
//! concurrent starters do not race.

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies the embedded schema migrations
pub struct DatabaseMigrations;

impl DatabaseMigrations {
    /// Run every migration that has not been applied yet
    pub async fn run_all(pool: &PgPool) -> Result<(), MigrateError> {
        info!(
            available = MIGRATOR.iter().count(),
            "Applying database migrations"
        );
        MIGRATOR.run(pool).await
    }

    /// Versions of the embedded migrations, oldest first
    pub fn versions() -> Vec<i64> {
        MIGRATOR.iter().map(|migration| migration.version).collect()
    }
}
