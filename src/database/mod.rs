//! # Database Operations
//!
//! Connection management and schema migrations for the Postgres store.
//!
//! - [`connection`] - pool construction from [`DatabaseConfig`](crate::config::DatabaseConfig)
//! - [`migrations`] - embedded schema migrations
//!
//! ```rust,no_run
//! use jobflow_core::config::JobFlowConfig;
//! use jobflow_core::database::{DatabaseConnection, DatabaseMigrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = JobFlowConfig::load()?;
//! let db = DatabaseConnection::connect(&config.database).await?;
//! DatabaseMigrations::run_all(db.pool()).await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod migrations;

pub use connection::DatabaseConnection;
pub use migrations::DatabaseMigrations;
