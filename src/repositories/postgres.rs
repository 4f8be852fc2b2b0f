//! Postgres-backed implementation of the repository and checker traits.
//!
//! Thin adapter over the model queries: it owns the pool and turns missing
//! rows into the typed not-found errors.

use super::traits::{
    JobCategoryChecker, JobPriorityChecker, JobRepository, JobStatusChecker, JobStatusRepository,
    PropertyChecker, TechnicianJobStatusChecker, TechnicianJobStatusRepository, UserChecker,
    WorkflowChecker, WorkflowRepository,
};
use crate::error::{map_row_not_found, JobFlowError, Result};
use crate::models::{
    Job, JobFilter, JobPage, JobStatus, NewJob, NewJobStatus, NewTechnicianJobStatus, NewWorkflow,
    NewWorkflowStatus, ReferenceLookup, TechnicianJobStatus, Workflow, WorkflowStatus,
};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl WorkflowRepository for PgStore {
    async fn get_by_id(&self, id: i64) -> Result<Workflow> {
        Workflow::find_by_id(&self.pool, id)
            .await?
            .ok_or(JobFlowError::WorkflowNotFound)
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Workflow>> {
        Ok(Workflow::list(&self.pool, active_only).await?)
    }

    async fn create(&self, workflow: &NewWorkflow) -> Result<Workflow> {
        Ok(Workflow::create(&self.pool, workflow).await?)
    }

    async fn update(&self, id: i64, workflow: &NewWorkflow) -> Result<Workflow> {
        Workflow::update(&self.pool, id, workflow)
            .await?
            .ok_or(JobFlowError::WorkflowNotFound)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        if Workflow::delete_with_statuses(&self.pool, id).await? {
            Ok(())
        } else {
            Err(JobFlowError::WorkflowNotFound)
        }
    }

    async fn duplicate(&self, id: i64) -> Result<Workflow> {
        Workflow::duplicate(&self.pool, id)
            .await?
            .ok_or(JobFlowError::WorkflowNotFound)
    }

    async fn is_active(&self, id: i64) -> Result<bool> {
        Ok(Workflow::is_active_by_id(&self.pool, id).await?)
    }

    async fn get_workflow_statuses(&self, workflow_id: i64) -> Result<Vec<WorkflowStatus>> {
        Ok(WorkflowStatus::find_by_workflow(&self.pool, workflow_id).await?)
    }

    async fn set_workflow_statuses(
        &self,
        workflow_id: i64,
        statuses: &[NewWorkflowStatus],
    ) -> Result<()> {
        Ok(WorkflowStatus::replace_for_workflow(&self.pool, workflow_id, statuses).await?)
    }
}

#[async_trait]
impl JobRepository for PgStore {
    async fn create(&self, job: &NewJob) -> Result<Job> {
        Ok(Job::create(&self.pool, job).await?)
    }

    async fn get_by_id(&self, id: i64) -> Result<Job> {
        Job::find_by_id(&self.pool, id)
            .await?
            .ok_or(JobFlowError::JobNotFound)
    }

    async fn list(&self, filter: &JobFilter, page: i64, page_size: i64) -> Result<JobPage> {
        let offset = (page - 1).max(0).saturating_mul(page_size);
        let jobs = Job::list(&self.pool, filter, page_size, offset).await?;
        let total = Job::count(&self.pool, filter).await?;

        Ok(JobPage {
            jobs,
            total,
            page,
            page_size,
        })
    }

    async fn update(&self, job: &Job) -> Result<Job> {
        Job::update(&self.pool, job)
            .await?
            .ok_or(JobFlowError::JobNotFound)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        if Job::soft_delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(JobFlowError::JobNotFound)
        }
    }

    async fn close(&self, id: i64, job_status_id: Option<i64>) -> Result<Job> {
        if let Some(job) = Job::close(&self.pool, id, job_status_id).await? {
            return Ok(job);
        }

        // The guarded UPDATE matched nothing; tell the two causes apart
        match Job::find_by_id(&self.pool, id).await? {
            Some(job) if job.closed => Err(JobFlowError::JobAlreadyClosed),
            _ => Err(JobFlowError::JobNotFound),
        }
    }
}

#[async_trait]
impl JobStatusRepository for PgStore {
    async fn create(&self, status: &NewJobStatus) -> Result<JobStatus> {
        Ok(JobStatus::create(&self.pool, status).await?)
    }

    async fn get_by_id(&self, id: i64) -> Result<JobStatus> {
        JobStatus::find_by_id(&self.pool, id)
            .await?
            .ok_or(JobFlowError::JobStatusNotFound)
    }

    async fn list(&self, active_only: bool) -> Result<Vec<JobStatus>> {
        Ok(JobStatus::list(&self.pool, active_only).await?)
    }

    async fn update(&self, id: i64, status: &NewJobStatus) -> Result<JobStatus> {
        JobStatus::update(&self.pool, id, status)
            .await?
            .ok_or(JobFlowError::JobStatusNotFound)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        if JobStatus::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(JobFlowError::JobStatusNotFound)
        }
    }
}

#[async_trait]
impl TechnicianJobStatusRepository for PgStore {
    async fn create(&self, status: &NewTechnicianJobStatus) -> Result<TechnicianJobStatus> {
        Ok(TechnicianJobStatus::create(&self.pool, status).await?)
    }

    async fn get_by_id(&self, id: i64) -> Result<TechnicianJobStatus> {
        TechnicianJobStatus::find_by_id(&self.pool, id)
            .await?
            .ok_or(JobFlowError::TechnicianJobStatusNotFound)
    }

    async fn list(&self, active_only: bool) -> Result<Vec<TechnicianJobStatus>> {
        Ok(TechnicianJobStatus::list(&self.pool, active_only).await?)
    }

    async fn update(
        &self,
        id: i64,
        status: &NewTechnicianJobStatus,
    ) -> Result<TechnicianJobStatus> {
        TechnicianJobStatus::update(&self.pool, id, status)
            .await?
            .ok_or(JobFlowError::TechnicianJobStatusNotFound)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        if TechnicianJobStatus::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(JobFlowError::TechnicianJobStatusNotFound)
        }
    }
}

#[async_trait]
impl JobCategoryChecker for PgStore {
    async fn job_category_exists(&self, id: i64) -> Result<bool> {
        Ok(ReferenceLookup::job_category_exists(&self.pool, id).await?)
    }
}

#[async_trait]
impl JobPriorityChecker for PgStore {
    async fn job_priority_exists(&self, id: i64) -> Result<bool> {
        Ok(ReferenceLookup::job_priority_exists(&self.pool, id).await?)
    }
}

#[async_trait]
impl JobStatusChecker for PgStore {
    async fn job_status_exists(&self, id: i64) -> Result<bool> {
        Ok(JobStatus::exists(&self.pool, id).await?)
    }
}

#[async_trait]
impl UserChecker for PgStore {
    async fn user_exists(&self, id: i64) -> Result<bool> {
        Ok(ReferenceLookup::user_exists(&self.pool, id).await?)
    }
}

#[async_trait]
impl WorkflowChecker for PgStore {
    async fn workflow_exists(&self, id: i64) -> Result<bool> {
        Ok(Workflow::find_by_id(&self.pool, id).await?.is_some())
    }

    async fn workflow_is_active(&self, id: i64) -> Result<bool> {
        Ok(Workflow::is_active_by_id(&self.pool, id).await?)
    }

    async fn initial_status_id(&self, workflow_id: i64) -> Result<i64> {
        if WorkflowStatus::count_for_workflow(&self.pool, workflow_id).await? == 0 {
            return Err(JobFlowError::WorkflowHasNoStatuses);
        }

        match WorkflowStatus::initial_status_id(&self.pool, workflow_id).await {
            Ok(Some(job_status_id)) => Ok(job_status_id),
            Ok(None) => Err(JobFlowError::InvalidJobStatus),
            Err(error) => {
                warn!(workflow_id, error = %error, "Initial status lookup failed");
                Err(JobFlowError::InvalidJobStatus)
            }
        }
    }
}

#[async_trait]
impl PropertyChecker for PgStore {
    async fn property_exists(&self, id: i64) -> Result<bool> {
        Ok(ReferenceLookup::property_exists(&self.pool, id).await?)
    }

    async fn workflow_id_for_property(&self, property_id: i64) -> Result<Option<i64>> {
        Ok(ReferenceLookup::workflow_id_for_property(&self.pool, property_id).await?)
    }
}

#[async_trait]
impl TechnicianJobStatusChecker for PgStore {
    async fn technician_job_status_is_active(&self, id: i64) -> Result<bool> {
        Ok(TechnicianJobStatus::is_active_by_id(&self.pool, id).await?)
    }

    async fn linked_job_status_id(&self, id: i64) -> Result<Option<i64>> {
        TechnicianJobStatus::linked_job_status_id(&self.pool, id)
            .await
            .map_err(|error| map_row_not_found(error, JobFlowError::TechnicianJobStatusNotFound))
    }
}
