//! # Status Synchronizer
//!
//! One-way propagation from a job's technician status to its primary status,
//! applied during job update before the job is persisted.
//!
//! When the incoming technician status is set and differs from the stored
//! one:
//!
//! 1. the technician status must exist and be active, otherwise the update
//!    fails with `InvalidTechnicianJobStatus`;
//! 2. its linked job status, if any, replaces the payload's `jobStatusId`.
//!
//! A missing link leaves the payload's status as given. A failure while
//! resolving the link is logged and treated the same as a missing link.

use crate::error::{JobFlowError, Result};
use crate::models::Job;
use crate::repositories::TechnicianJobStatusChecker;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the synchronizer did to an incoming job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Technician status unset or unchanged; the rule did not apply
    Unchanged,
    /// Technician status changed but carries no usable link
    NoLink,
    /// `job_status_id` was replaced by the linked status
    Overridden { from: i64, to: i64 },
}

pub struct StatusSynchronizer {
    technician_statuses: Arc<dyn TechnicianJobStatusChecker>,
}

impl StatusSynchronizer {
    pub fn new(technician_statuses: Arc<dyn TechnicianJobStatusChecker>) -> Self {
        Self {
            technician_statuses,
        }
    }

    /// Apply the rule to `incoming`, comparing against the `stored` job
    pub async fn synchronize(&self, stored: &Job, incoming: &mut Job) -> Result<SyncOutcome> {
        let Some(technician_job_status_id) = incoming
            .technician_job_status_id
            .filter(|id| *id > 0 && Some(*id) != stored.technician_job_status_id)
        else {
            return Ok(SyncOutcome::Unchanged);
        };

        if !self
            .technician_statuses
            .technician_job_status_is_active(technician_job_status_id)
            .await?
        {
            return Err(JobFlowError::InvalidTechnicianJobStatus);
        }

        let linked = match self
            .technician_statuses
            .linked_job_status_id(technician_job_status_id)
            .await
        {
            Ok(linked) => linked,
            Err(error) => {
                warn!(
                    job_id = incoming.id,
                    technician_job_status_id,
                    error = %error,
                    "Linked job status lookup failed; keeping payload status"
                );
                None
            }
        };

        let Some(linked_job_status_id) = linked else {
            debug!(
                job_id = incoming.id,
                technician_job_status_id, "Technician status has no linked job status"
            );
            return Ok(SyncOutcome::NoLink);
        };

        let from = incoming.job_status_id;
        incoming.job_status_id = linked_job_status_id;
        info!(
            job_id = incoming.id,
            technician_job_status_id,
            from_job_status_id = from,
            to_job_status_id = linked_job_status_id,
            "Job status synchronized from technician status"
        );

        Ok(SyncOutcome::Overridden {
            from,
            to: linked_job_status_id,
        })
    }
}
