//! # Status Catalogs
//!
//! Validated CRUD for the two flat status catalogs: primary job statuses and
//! the technician-facing statuses that may link to one of them.
//!
//! Validation is limited to a non-blank `label` and, when present, a `class`
//! from the fixed palette. Deletes are hard and do not look for references.

use crate::error::Result;
use crate::models::{JobStatus, NewJobStatus, NewTechnicianJobStatus, TechnicianJobStatus};
use crate::repositories::{JobStatusRepository, TechnicianJobStatusRepository};
use crate::validation::{parse_status_class, positive_id, require_text};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Client payload for creating or updating a job status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobStatusPayload {
    pub label: String,
    pub class: Option<String>,
    /// Defaults to active when absent
    pub is_active: Option<bool>,
}

/// Client payload for creating or updating a technician job status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnicianJobStatusPayload {
    pub label: String,
    pub class: Option<String>,
    /// Linked primary status; zero means no link
    pub job_status_id: Option<i64>,
    pub is_active: Option<bool>,
}

impl JobStatusPayload {
    fn validate(&self) -> Result<NewJobStatus> {
        require_text("label", &self.label, "label is required")?;
        Ok(NewJobStatus {
            label: self.label.trim().to_string(),
            class: parse_status_class(self.class.as_deref())?,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

impl TechnicianJobStatusPayload {
    fn validate(&self) -> Result<NewTechnicianJobStatus> {
        require_text("label", &self.label, "label is required")?;
        Ok(NewTechnicianJobStatus {
            label: self.label.trim().to_string(),
            class: parse_status_class(self.class.as_deref())?,
            job_status_id: positive_id(self.job_status_id),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

pub struct JobStatusService {
    repository: Arc<dyn JobStatusRepository>,
}

impl JobStatusService {
    pub fn new(repository: Arc<dyn JobStatusRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: &JobStatusPayload) -> Result<JobStatus> {
        let new_status = payload.validate()?;
        let created = self.repository.create(&new_status).await?;
        info!(job_status_id = created.id, label = %created.label, "Job status created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<JobStatus> {
        self.repository.get_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, active_only: bool) -> Result<Vec<JobStatus>> {
        self.repository.list(active_only).await
    }

    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: i64, payload: &JobStatusPayload) -> Result<JobStatus> {
        let changes = payload.validate()?;
        let updated = self.repository.update(id, &changes).await?;
        debug!(job_status_id = id, "Job status updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.repository.delete(id).await?;
        info!(job_status_id = id, "Job status deleted");
        Ok(())
    }
}

pub struct TechnicianJobStatusService {
    repository: Arc<dyn TechnicianJobStatusRepository>,
}

impl TechnicianJobStatusService {
    pub fn new(repository: Arc<dyn TechnicianJobStatusRepository>) -> Self {
        Self { repository }
    }

    /// The link target is stored as given; it is not checked against the
    /// job status catalog.
    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: &TechnicianJobStatusPayload) -> Result<TechnicianJobStatus> {
        let new_status = payload.validate()?;
        let created = self.repository.create(&new_status).await?;
        info!(
            technician_job_status_id = created.id,
            linked_job_status_id = created.job_status_id,
            "Technician job status created"
        );
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<TechnicianJobStatus> {
        self.repository.get_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, active_only: bool) -> Result<Vec<TechnicianJobStatus>> {
        self.repository.list(active_only).await
    }

    #[instrument(skip(self, payload))]
    pub async fn update(
        &self,
        id: i64,
        payload: &TechnicianJobStatusPayload,
    ) -> Result<TechnicianJobStatus> {
        let changes = payload.validate()?;
        let updated = self.repository.update(id, &changes).await?;
        debug!(technician_job_status_id = id, "Technician job status updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.repository.delete(id).await?;
        info!(technician_job_status_id = id, "Technician job status deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::StatusClass;

    #[test]
    fn test_payload_defaults_to_active() {
        let payload: JobStatusPayload =
            serde_json::from_value(serde_json::json!({ "label": "Scheduled" })).unwrap();
        let new_status = payload.validate().unwrap();
        assert!(new_status.is_active);
        assert_eq!(new_status.class, None);
    }

    #[test]
    fn test_payload_parses_class_and_trims_label() {
        let payload = JobStatusPayload {
            label: "  Done ".to_string(),
            class: Some("teal".to_string()),
            is_active: Some(false),
        };
        let new_status = payload.validate().unwrap();
        assert_eq!(new_status.label, "Done");
        assert_eq!(new_status.class, Some(StatusClass::Teal));
        assert!(!new_status.is_active);
    }

    #[test]
    fn test_technician_payload_zero_link_means_none() {
        let payload = TechnicianJobStatusPayload {
            label: "On site".to_string(),
            job_status_id: Some(0),
            ..Default::default()
        };
        assert_eq!(payload.validate().unwrap().job_status_id, None);
    }
}
