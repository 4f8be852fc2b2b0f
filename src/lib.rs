#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # JobFlow Core
//!
//! Workflow-driven job status engine for field-service jobs.
//!
//! ## Overview
//!
//! A workflow is a named, ordered sequence of job statuses. Customers are
//! assigned a workflow, and every job created at one of their properties
//! starts at position 0 of that sequence. Jobs then move through statuses
//! until they are closed, while technicians report their own statuses that
//! can pull the job's primary status along with them.
//!
//! ## Module Organization
//!
//! - [`services`] - Status catalogs, workflow sequencer, job lifecycle, status sync
//! - [`repositories`] - Collaborator traits with Postgres and in-memory stores
//! - [`models`] - Persisted entities and their queries
//! - [`database`] - Connection pool and embedded migrations
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging
//! - [`error`] - Error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jobflow_core::config::JobFlowConfig;
//! use jobflow_core::database::DatabaseConnection;
//! use jobflow_core::services::{JobFlowServices, JobPayload};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = JobFlowConfig::load()?;
//! let connection = DatabaseConnection::bootstrap(&config.database).await?;
//! let services = JobFlowServices::postgres(connection.pool().clone());
//!
//! let job = services
//!     .jobs
//!     .create(&JobPayload {
//!         job_category_id: Some(1),
//!         job_priority_id: Some(1),
//!         property_id: Some(42),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("job {} starts at status {}", job.id, job.job_status_id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test                            # unit and in-memory service tests
//! cargo test --features postgres-tests  # Postgres-backed tests, needs DATABASE_URL
//! ```

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod services;
pub mod validation;

pub use config::{DatabaseConfig, JobFlowConfig, LogFormat, LoggingConfig};
pub use constants::StatusClass;
pub use database::{DatabaseConnection, DatabaseMigrations};
pub use error::{ErrorKind, JobFlowError, Result};
pub use models::{
    Job, JobFilter, JobPage, JobStatus, TechnicianJobStatus, Workflow, WorkflowStatus,
};
pub use repositories::{InMemoryStore, JobFlowStore, PgStore};
pub use services::{
    JobCollaborators, JobFlowServices, JobPayload, JobService, JobStatusPayload, JobStatusService,
    StatusSynchronizer, SyncOutcome, TechnicianJobStatusPayload, TechnicianJobStatusService,
    WorkflowPayload, WorkflowService,
};
