//! # Workflow Sequencer
//!
//! Owns each workflow's ordered list of job statuses.
//!
//! A sequence is always supplied in full as `statusIds`; position in that
//! list becomes the `order` (0-based) and position 0 is the initial status
//! handed to new jobs. Sequences are replaced wholesale, never diffed, and
//! ids are neither sorted nor deduplicated.
//!
//! On update the distinction between an absent and an empty `statusIds`
//! matters:
//!
//! | `statusIds` | effect on the sequence |
//! |-------------|------------------------|
//! | absent      | untouched              |
//! | `[]`        | cleared                |
//! | `[a, b]`    | replaced by `a, b`     |

use crate::error::{JobFlowError, Result};
use crate::logging::log_workflow_operation;
use crate::models::{NewWorkflow, NewWorkflowStatus, Workflow, WorkflowStatus};
use crate::repositories::{WorkflowChecker, WorkflowRepository};
use crate::validation::normalize_optional_text;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Client payload for creating or updating a workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowPayload {
    pub name: String,
    pub notes: Option<String>,
    /// Defaults to active when absent
    pub is_active: Option<bool>,
    /// Complete desired sequence; `None` leaves it untouched on update
    pub status_ids: Option<Vec<i64>>,
}

impl WorkflowPayload {
    fn validate(&self) -> Result<NewWorkflow> {
        if self.name.trim().is_empty() {
            return Err(JobFlowError::WorkflowNameRequired);
        }
        Ok(NewWorkflow {
            name: self.name.trim().to_string(),
            notes: normalize_optional_text(self.notes.clone()),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

pub struct WorkflowService {
    repository: Arc<dyn WorkflowRepository>,
    checker: Arc<dyn WorkflowChecker>,
}

impl WorkflowService {
    pub fn new(repository: Arc<dyn WorkflowRepository>, checker: Arc<dyn WorkflowChecker>) -> Self {
        Self {
            repository,
            checker,
        }
    }

    /// Create a workflow and, when `statusIds` is non-empty, its sequence
    #[instrument(skip(self, payload), fields(name = %payload.name))]
    pub async fn create(&self, payload: &WorkflowPayload) -> Result<Workflow> {
        let new_workflow = payload.validate()?;
        let mut workflow = self.repository.create(&new_workflow).await?;

        let status_ids = payload.status_ids.as_deref().unwrap_or_default();
        if !status_ids.is_empty() {
            self.replace_sequence(workflow.id, status_ids).await?;
        }
        workflow.statuses = self.repository.get_workflow_statuses(workflow.id).await?;

        log_workflow_operation(
            "create",
            Some(workflow.id),
            Some(&workflow.name),
            Some(workflow.statuses.len()),
            "success",
        );
        Ok(workflow)
    }

    /// Update workflow fields; replace the sequence only when `statusIds` is present
    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: i64, payload: &WorkflowPayload) -> Result<Workflow> {
        let changes = payload.validate()?;
        let mut workflow = self.repository.update(id, &changes).await?;

        if let Some(status_ids) = payload.status_ids.as_deref() {
            self.replace_sequence(workflow.id, status_ids).await?;
        }
        workflow.statuses = self.repository.get_workflow_statuses(workflow.id).await?;

        log_workflow_operation(
            "update",
            Some(workflow.id),
            Some(&workflow.name),
            Some(workflow.statuses.len()),
            "success",
        );
        Ok(workflow)
    }

    /// Remove the workflow together with its sequence
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.repository.delete(id).await?;
        log_workflow_operation("delete", Some(id), None, None, "success");
        Ok(())
    }

    /// Copy a workflow as `Copy of <name> (<new id>)` with the same sequence
    #[instrument(skip(self))]
    pub async fn duplicate(&self, id: i64) -> Result<Workflow> {
        let copy = self.repository.duplicate(id).await?;
        log_workflow_operation(
            "duplicate",
            Some(copy.id),
            Some(&copy.name),
            Some(copy.statuses.len()),
            "success",
        );
        Ok(copy)
    }

    /// Workflow with its statuses; a failing status lookup yields an empty sequence
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<Workflow> {
        let mut workflow = self.repository.get_by_id(id).await?;
        workflow.statuses = self.statuses_best_effort(workflow.id).await;
        Ok(workflow)
    }

    /// Live workflows ordered by name, each with its statuses
    #[instrument(skip(self))]
    pub async fn list(&self, active_only: bool) -> Result<Vec<Workflow>> {
        let mut workflows = self.repository.list(active_only).await?;
        for workflow in &mut workflows {
            workflow.statuses = self.statuses_best_effort(workflow.id).await;
        }
        Ok(workflows)
    }

    /// Job status at order 0
    #[instrument(skip(self))]
    pub async fn initial_status_id(&self, workflow_id: i64) -> Result<i64> {
        let job_status_id = self.checker.initial_status_id(workflow_id).await?;
        debug!(workflow_id, job_status_id, "Resolved initial status");
        Ok(job_status_id)
    }

    async fn replace_sequence(&self, workflow_id: i64, status_ids: &[i64]) -> Result<()> {
        let sequence = NewWorkflowStatus::sequence_from_ids(status_ids);
        self.repository
            .set_workflow_statuses(workflow_id, &sequence)
            .await?;
        debug!(workflow_id, status_count = sequence.len(), "Replaced workflow sequence");
        Ok(())
    }

    async fn statuses_best_effort(&self, workflow_id: i64) -> Vec<WorkflowStatus> {
        match self.repository.get_workflow_statuses(workflow_id).await {
            Ok(statuses) => statuses,
            Err(error) => {
                warn!(workflow_id, error = %error, "Failed to load workflow statuses");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl WorkflowChecker for WorkflowService {
    async fn workflow_exists(&self, id: i64) -> Result<bool> {
        self.checker.workflow_exists(id).await
    }

    async fn workflow_is_active(&self, id: i64) -> Result<bool> {
        self.checker.workflow_is_active(id).await
    }

    async fn initial_status_id(&self, workflow_id: i64) -> Result<i64> {
        WorkflowService::initial_status_id(self, workflow_id).await
    }
}
