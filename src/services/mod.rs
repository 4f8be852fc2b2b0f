//! # Services
//!
//! The four components of the job status engine, each receiving its
//! collaborators through its constructor.

pub mod job_lifecycle;
pub mod status_catalog;
pub mod status_sync;
pub mod workflow_sequencer;

pub use job_lifecycle::{JobCollaborators, JobPayload, JobService};
pub use status_catalog::{
    JobStatusPayload, JobStatusService, TechnicianJobStatusPayload, TechnicianJobStatusService,
};
pub use status_sync::{StatusSynchronizer, SyncOutcome};
pub use workflow_sequencer::{WorkflowPayload, WorkflowService};

use crate::repositories::{JobFlowStore, PgStore};
use sqlx::PgPool;
use std::sync::Arc;

/// Every service wired against one store
///
/// Job creation resolves its initial status through the workflow sequencer.
pub struct JobFlowServices {
    pub job_statuses: JobStatusService,
    pub technician_job_statuses: TechnicianJobStatusService,
    pub workflows: Arc<WorkflowService>,
    pub jobs: JobService,
}

impl JobFlowServices {
    pub fn from_store<S: JobFlowStore + 'static>(store: Arc<S>) -> Self {
        let workflows = Arc::new(WorkflowService::new(store.clone(), store.clone()));
        let collaborators = JobCollaborators::from_store(store.clone()).with_workflows(workflows.clone());

        Self {
            job_statuses: JobStatusService::new(store.clone()),
            technician_job_statuses: TechnicianJobStatusService::new(store),
            workflows,
            jobs: JobService::new(collaborators),
        }
    }

    /// Services backed by Postgres
    pub fn postgres(pool: PgPool) -> Self {
        Self::from_store(Arc::new(PgStore::new(pool)))
    }
}
