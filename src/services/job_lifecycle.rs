//! # Job Lifecycle Controller
//!
//! Validates and applies job mutations. The controller holds no SQL: every
//! lookup goes through a narrow checker collaborator.
//!
//! ## State model
//!
//! ```text
//! open ──close──▶ closed        (terminal, no re-open)
//!   │                │
//!   └────delete──────┴──▶ deleted (soft, terminal; reads report JobNotFound)
//! ```
//!
//! ## Create
//!
//! Checks run in a fixed order so that the first failure is deterministic:
//! required fields, category, priority, property, workflow resolution from
//! the property's customer, initial status from the workflow, then user.
//! `workflowId` and `jobStatusId` are derived and any client value is ignored.
//!
//! ## Update
//!
//! Only references that differ from the stored job are revalidated, so a
//! payload echoing stored values is always accepted. The technician status
//! rule from [`StatusSynchronizer`] runs last, just before persisting.

use super::status_sync::{StatusSynchronizer, SyncOutcome};
use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::error::{JobFlowError, Result};
use crate::logging::log_job_operation;
use crate::models::{Job, JobFilter, JobPage, NewJob};
use crate::repositories::{
    JobCategoryChecker, JobFlowStore, JobPriorityChecker, JobRepository, JobStatusChecker,
    PropertyChecker, TechnicianJobStatusChecker, UserChecker, WorkflowChecker,
};
use crate::validation::{normalize_optional_text, positive_id, require_id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Client payload for creating or updating a job
///
/// Fields a client cannot control (`closed`, timestamps) are absent; on
/// create `workflow_id` and `job_status_id` are ignored as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobPayload {
    pub workflow_id: Option<i64>,
    pub job_status_id: Option<i64>,
    pub technician_job_status_id: Option<i64>,
    pub job_category_id: Option<i64>,
    pub job_priority_id: Option<i64>,
    pub property_id: Option<i64>,
    pub user_id: Option<i64>,
    pub work_order: Option<String>,
    pub description: Option<String>,
    pub date_received: Option<DateTime<Utc>>,
}

/// Collaborators the controller delegates every lookup and write to
#[derive(Clone)]
pub struct JobCollaborators {
    pub jobs: Arc<dyn JobRepository>,
    pub categories: Arc<dyn JobCategoryChecker>,
    pub priorities: Arc<dyn JobPriorityChecker>,
    pub statuses: Arc<dyn JobStatusChecker>,
    pub users: Arc<dyn UserChecker>,
    pub workflows: Arc<dyn WorkflowChecker>,
    pub properties: Arc<dyn PropertyChecker>,
    pub technician_statuses: Arc<dyn TechnicianJobStatusChecker>,
}

impl JobCollaborators {
    /// Take every collaborator from one store
    pub fn from_store<S: JobFlowStore + 'static>(store: Arc<S>) -> Self {
        Self {
            jobs: store.clone(),
            categories: store.clone(),
            priorities: store.clone(),
            statuses: store.clone(),
            users: store.clone(),
            workflows: store.clone(),
            properties: store.clone(),
            technician_statuses: store,
        }
    }

    /// Replace the workflow checker, e.g. with the workflow sequencer
    pub fn with_workflows(mut self, workflows: Arc<dyn WorkflowChecker>) -> Self {
        self.workflows = workflows;
        self
    }

    pub fn with_technician_statuses(
        mut self,
        technician_statuses: Arc<dyn TechnicianJobStatusChecker>,
    ) -> Self {
        self.technician_statuses = technician_statuses;
        self
    }
}

pub struct JobService {
    collaborators: JobCollaborators,
    synchronizer: StatusSynchronizer,
}

impl JobService {
    pub fn new(collaborators: JobCollaborators) -> Self {
        let synchronizer = StatusSynchronizer::new(collaborators.technician_statuses.clone());
        Self {
            collaborators,
            synchronizer,
        }
    }

    /// Create an open job with derived workflow and initial status
    #[instrument(skip(self, payload), fields(property_id = ?payload.property_id))]
    pub async fn create(&self, payload: &JobPayload) -> Result<Job> {
        let job_category_id = payload.job_category_id.unwrap_or_default();
        let job_priority_id = payload.job_priority_id.unwrap_or_default();
        let property_id = payload.property_id.unwrap_or_default();
        require_id("jobCategoryId", job_category_id, "job category is required")?;
        require_id("jobPriorityId", job_priority_id, "job priority is required")?;
        require_id("propertyId", property_id, "property is required")?;

        self.ensure_category(job_category_id).await?;
        self.ensure_priority(job_priority_id).await?;
        if !self.collaborators.properties.property_exists(property_id).await? {
            return Err(JobFlowError::InvalidProperty);
        }

        let workflow_id = self
            .collaborators
            .properties
            .workflow_id_for_property(property_id)
            .await?
            .ok_or(JobFlowError::InvalidWorkflow)?;
        let job_status_id = self
            .collaborators
            .workflows
            .initial_status_id(workflow_id)
            .await?;
        debug!(workflow_id, job_status_id, "Derived workflow and initial status");

        let user_id = positive_id(payload.user_id);
        if let Some(user_id) = user_id {
            self.ensure_user(user_id).await?;
        }

        let new_job = NewJob {
            workflow_id,
            job_status_id,
            technician_job_status_id: positive_id(payload.technician_job_status_id),
            job_category_id,
            job_priority_id,
            property_id,
            user_id,
            work_order: normalize_optional_text(payload.work_order.clone()),
            description: payload.description.clone(),
            date_received: payload.date_received.unwrap_or_else(Utc::now),
        };

        let job = self.collaborators.jobs.create(&new_job).await?;
        log_job_operation(
            "create",
            Some(job.id),
            Some(job.workflow_id),
            Some(job.job_status_id),
            "success",
            None,
        );
        Ok(job)
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<Job> {
        self.collaborators.jobs.get_by_id(id).await
    }

    /// One page of jobs; `page` is 1-based, `page_size` defaults to 25 and is capped at 100
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &JobFilter,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<JobPage> {
        if let Some(workflow_id) = filter.workflow_id {
            // Active flag only; a soft-deleted but active workflow passes
            if !self
                .collaborators
                .workflows
                .workflow_is_active(workflow_id)
                .await?
            {
                return Err(JobFlowError::InvalidWorkflow);
            }
        }

        let page = page.filter(|page| *page > 0).unwrap_or(1);
        let page_size = page_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);

        self.collaborators.jobs.list(filter, page, page_size).await
    }

    /// Merge `payload` onto the stored job and persist it
    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: i64, payload: &JobPayload) -> Result<Job> {
        require_id("id", id, "id is required")?;
        let stored = self.collaborators.jobs.get_by_id(id).await?;
        let mut job = stored.clone();

        if let Some(job_category_id) = changed(payload.job_category_id, stored.job_category_id) {
            self.ensure_category(job_category_id).await?;
            job.job_category_id = job_category_id;
        }
        if let Some(job_priority_id) = changed(payload.job_priority_id, stored.job_priority_id) {
            self.ensure_priority(job_priority_id).await?;
            job.job_priority_id = job_priority_id;
        }
        if let Some(job_status_id) = changed(payload.job_status_id, stored.job_status_id) {
            self.ensure_job_status(job_status_id).await?;
            job.job_status_id = job_status_id;
        }
        if let Some(workflow_id) = changed(payload.workflow_id, stored.workflow_id) {
            if !self.collaborators.workflows.workflow_exists(workflow_id).await? {
                return Err(JobFlowError::InvalidWorkflow);
            }
            job.workflow_id = workflow_id;
        }
        if let Some(property_id) = positive_id(payload.property_id) {
            job.property_id = property_id;
        }

        let user_id = positive_id(payload.user_id);
        if let Some(user_id) = user_id.filter(|user_id| Some(*user_id) != stored.user_id) {
            self.ensure_user(user_id).await?;
        }
        job.user_id = user_id;

        job.technician_job_status_id = positive_id(payload.technician_job_status_id);
        job.work_order = normalize_optional_text(payload.work_order.clone());
        job.description = payload.description.clone();
        job.date_received = payload.date_received.or(stored.date_received);

        let outcome = self.synchronizer.synchronize(&stored, &mut job).await?;

        let updated = self.collaborators.jobs.update(&job).await?;
        let details = match outcome {
            SyncOutcome::Overridden { .. } => Some("job status synchronized from technician status"),
            SyncOutcome::Unchanged | SyncOutcome::NoLink => None,
        };
        log_job_operation(
            "update",
            Some(updated.id),
            Some(updated.workflow_id),
            Some(updated.job_status_id),
            "success",
            details,
        );
        Ok(updated)
    }

    /// Close an open job, optionally moving it to `job_status_id`
    #[instrument(skip(self))]
    pub async fn close(&self, id: i64, job_status_id: Option<i64>) -> Result<Job> {
        let stored = self.collaborators.jobs.get_by_id(id).await?;
        if stored.closed {
            return Err(JobFlowError::JobAlreadyClosed);
        }

        let job_status_id = positive_id(job_status_id);
        if let Some(job_status_id) = job_status_id {
            self.ensure_job_status(job_status_id).await?;
        }

        let closed = self.collaborators.jobs.close(id, job_status_id).await?;
        log_job_operation(
            "close",
            Some(closed.id),
            Some(closed.workflow_id),
            Some(closed.job_status_id),
            "success",
            None,
        );
        Ok(closed)
    }

    /// Soft delete
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        let stored = self.collaborators.jobs.get_by_id(id).await?;
        self.collaborators.jobs.delete(stored.id).await?;
        log_job_operation(
            "delete",
            Some(stored.id),
            Some(stored.workflow_id),
            None,
            "success",
            None,
        );
        Ok(())
    }

    async fn ensure_category(&self, id: i64) -> Result<()> {
        debug!(job_category_id = id, "Validating job category");
        if !self.collaborators.categories.job_category_exists(id).await? {
            return Err(JobFlowError::InvalidJobCategory);
        }
        Ok(())
    }

    async fn ensure_priority(&self, id: i64) -> Result<()> {
        debug!(job_priority_id = id, "Validating job priority");
        if !self.collaborators.priorities.job_priority_exists(id).await? {
            return Err(JobFlowError::InvalidJobPriority);
        }
        Ok(())
    }

    async fn ensure_job_status(&self, id: i64) -> Result<()> {
        debug!(job_status_id = id, "Validating job status");
        if !self.collaborators.statuses.job_status_exists(id).await? {
            return Err(JobFlowError::InvalidJobStatus);
        }
        Ok(())
    }

    async fn ensure_user(&self, id: i64) -> Result<()> {
        debug!(user_id = id, "Validating user");
        if !self.collaborators.users.user_exists(id).await? {
            return Err(JobFlowError::InvalidUser);
        }
        Ok(())
    }
}

/// A positive payload id that differs from the stored one
fn changed(incoming: Option<i64>, stored: i64) -> Option<i64> {
    positive_id(incoming).filter(|id| *id != stored)
}
