//! # JobFlow Migrator
//!
//! Applies the embedded schema migrations to the configured database.
//!
//! Configuration comes from `config/jobflow.toml`, the environment overlay,
//! `JOBFLOW__*` variables and `DATABASE_URL`. Pass `--list` to print the
//! embedded migration versions without connecting.

use anyhow::Context;
use jobflow_core::config::JobFlowConfig;
use jobflow_core::database::{DatabaseConnection, DatabaseMigrations};
use jobflow_core::logging::init_structured_logging;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().skip(1).any(|arg| arg == "--list") {
        for version in DatabaseMigrations::versions() {
            println!("{version}");
        }
        return Ok(());
    }

    let config = JobFlowConfig::load().context("failed to load configuration")?;
    init_structured_logging(&config.logging, &config.environment);

    let connection = DatabaseConnection::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    DatabaseMigrations::run_all(connection.pool())
        .await
        .context("failed to apply migrations")?;

    info!(
        environment = %config.environment,
        versions = DatabaseMigrations::versions().len(),
        "Migrations applied"
    );

    connection.close().await;
    Ok(())
}
