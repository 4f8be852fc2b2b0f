//! Collaborator seams consumed by the services.
//!
//! Repositories own persistence; checkers answer narrow existence questions
//! with a plain `bool` and expose any typed lookup as a separate method. All
//! calls are request-scoped and surface failures immediately, with no retries.

use crate::error::Result;
use crate::models::{
    Job, JobFilter, JobPage, JobStatus, NewJob, NewJobStatus, NewTechnicianJobStatus, NewWorkflow,
    NewWorkflowStatus, TechnicianJobStatus, Workflow, WorkflowStatus,
};
use async_trait::async_trait;

/// Persistence for workflows and their ordered status sequences
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Live workflow without its statuses; `WorkflowNotFound` if absent or deleted
    async fn get_by_id(&self, id: i64) -> Result<Workflow>;

    /// Live workflows ordered by name, without statuses
    async fn list(&self, active_only: bool) -> Result<Vec<Workflow>>;

    async fn create(&self, workflow: &NewWorkflow) -> Result<Workflow>;

    /// `WorkflowNotFound` if absent or deleted
    async fn update(&self, id: i64, workflow: &NewWorkflow) -> Result<Workflow>;

    /// Remove the workflow and its sequence as one atomic unit
    async fn delete(&self, id: i64) -> Result<()>;

    /// Copy a workflow and its sequence, returning the populated copy
    async fn duplicate(&self, id: i64) -> Result<Workflow>;

    /// Active flag of the workflow row; soft-deletion is not considered
    async fn is_active(&self, id: i64) -> Result<bool>;

    /// Sequence ordered by position
    async fn get_workflow_statuses(&self, workflow_id: i64) -> Result<Vec<WorkflowStatus>>;

    /// Replace the whole sequence atomically (delete-all, then insert in order)
    async fn set_workflow_statuses(
        &self,
        workflow_id: i64,
        statuses: &[NewWorkflowStatus],
    ) -> Result<()>;
}

/// Persistence for jobs; reads never return soft-deleted rows
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &NewJob) -> Result<Job>;

    /// `JobNotFound` if absent or soft-deleted
    async fn get_by_id(&self, id: i64) -> Result<Job>;

    /// `page` is 1-based and `page_size` already bounded by the caller
    async fn list(&self, filter: &JobFilter, page: i64, page_size: i64) -> Result<JobPage>;

    /// Persist mutable fields; `closed` and `deleted_at` are left untouched
    async fn update(&self, job: &Job) -> Result<Job>;

    /// Soft delete
    async fn delete(&self, id: i64) -> Result<()>;

    /// Mark closed and optionally set the status in a single write
    async fn close(&self, id: i64, job_status_id: Option<i64>) -> Result<Job>;
}

#[async_trait]
pub trait JobStatusRepository: Send + Sync {
    async fn create(&self, status: &NewJobStatus) -> Result<JobStatus>;

    /// `JobStatusNotFound` if absent
    async fn get_by_id(&self, id: i64) -> Result<JobStatus>;

    async fn list(&self, active_only: bool) -> Result<Vec<JobStatus>>;

    async fn update(&self, id: i64, status: &NewJobStatus) -> Result<JobStatus>;

    /// Hard delete without a reference check
    async fn delete(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait TechnicianJobStatusRepository: Send + Sync {
    async fn create(&self, status: &NewTechnicianJobStatus) -> Result<TechnicianJobStatus>;

    /// `TechnicianJobStatusNotFound` if absent
    async fn get_by_id(&self, id: i64) -> Result<TechnicianJobStatus>;

    async fn list(&self, active_only: bool) -> Result<Vec<TechnicianJobStatus>>;

    async fn update(
        &self,
        id: i64,
        status: &NewTechnicianJobStatus,
    ) -> Result<TechnicianJobStatus>;

    /// Hard delete without a reference check
    async fn delete(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait JobCategoryChecker: Send + Sync {
    async fn job_category_exists(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait JobPriorityChecker: Send + Sync {
    async fn job_priority_exists(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait JobStatusChecker: Send + Sync {
    async fn job_status_exists(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait UserChecker: Send + Sync {
    async fn user_exists(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait WorkflowChecker: Send + Sync {
    /// Live (not deleted) workflow
    async fn workflow_exists(&self, id: i64) -> Result<bool>;

    /// Active flag only
    async fn workflow_is_active(&self, id: i64) -> Result<bool>;

    /// Job status at position 0 of the workflow's sequence
    ///
    /// `WorkflowHasNoStatuses` for an empty sequence, `InvalidJobStatus` when
    /// rows exist but position 0 cannot be resolved.
    async fn initial_status_id(&self, workflow_id: i64) -> Result<i64>;
}

#[async_trait]
pub trait PropertyChecker: Send + Sync {
    async fn property_exists(&self, id: i64) -> Result<bool>;

    /// Workflow of the property's owning customer, if one is assigned
    async fn workflow_id_for_property(&self, property_id: i64) -> Result<Option<i64>>;
}

#[async_trait]
pub trait TechnicianJobStatusChecker: Send + Sync {
    /// True only for an existing, active technician status
    async fn technician_job_status_is_active(&self, id: i64) -> Result<bool>;

    /// Job status the technician status links to, if any
    async fn linked_job_status_id(&self, id: i64) -> Result<Option<i64>>;
}
