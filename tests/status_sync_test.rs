//! Status Synchronizer Tests
//!
//! Technician status → job status propagation during job update.

mod support;

use async_trait::async_trait;
use jobflow_core::error::{JobFlowError, Result};
use jobflow_core::models::{Job, NewTechnicianJobStatus};
use jobflow_core::repositories::{
    InMemoryStore, TechnicianJobStatusChecker, TechnicianJobStatusRepository,
};
use jobflow_core::services::{
    JobCollaborators, JobFlowServices, JobPayload, JobService, JobStatusPayload,
    StatusSynchronizer, SyncOutcome, TechnicianJobStatusPayload, WorkflowPayload,
};
use parking_lot::Mutex;
use std::sync::Arc;
use support::{echo_payload, Fixture};

/// Technician checker whose link lookup always fails
struct FailingLinkChecker {
    active: bool,
    link_calls: Mutex<Vec<i64>>,
}

impl FailingLinkChecker {
    fn new(active: bool) -> Self {
        Self {
            active,
            link_calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TechnicianJobStatusChecker for FailingLinkChecker {
    async fn technician_job_status_is_active(&self, _id: i64) -> Result<bool> {
        Ok(self.active)
    }

    async fn linked_job_status_id(&self, id: i64) -> Result<Option<i64>> {
        self.link_calls.lock().push(id);
        Err(JobFlowError::internal("link lookup unavailable"))
    }
}

async fn technician_status(fixture: &Fixture, label: &str, link: Option<i64>, active: bool) -> i64 {
    fixture
        .services
        .technician_job_statuses
        .create(&TechnicianJobStatusPayload {
            label: label.to_string(),
            job_status_id: link,
            is_active: Some(active),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_linked_status_overrides_payload() {
    let fixture = Fixture::new();
    let job = fixture.open_job(&[3, 50]).await;
    let on_site = technician_status(&fixture, "On site", Some(50), true).await;

    let updated = fixture
        .services
        .jobs
        .update(
            job.id,
            &JobPayload {
                technician_job_status_id: Some(on_site),
                job_status_id: Some(3),
                ..echo_payload(&job)
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.technician_job_status_id, Some(on_site));
    assert_eq!(updated.job_status_id, 50);
}

#[tokio::test]
async fn test_unlinked_status_keeps_payload_status() {
    let fixture = Fixture::new();
    let job = fixture.open_job(&[1, 2]).await;
    let en_route = technician_status(&fixture, "En route", None, true).await;

    let mut job_status_ids = Vec::new();
    for label in ["Scheduled", "Dispatched", "Waiting"] {
        let status = fixture
            .services
            .job_statuses
            .create(&JobStatusPayload {
                label: label.to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        job_status_ids.push(status.id);
    }

    let updated = fixture
        .services
        .jobs
        .update(
            job.id,
            &JobPayload {
                technician_job_status_id: Some(en_route),
                job_status_id: Some(job_status_ids[2]),
                ..echo_payload(&job)
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.job_status_id, job_status_ids[2]);
    assert_eq!(updated.technician_job_status_id, Some(en_route));
}

#[tokio::test]
async fn test_inactive_or_missing_technician_status_fails() {
    let fixture = Fixture::new();
    let job = fixture.open_job(&[1]).await;
    let retired = technician_status(&fixture, "Retired", Some(1), false).await;

    for technician_job_status_id in [retired, 404] {
        let error = fixture
            .services
            .jobs
            .update(
                job.id,
                &JobPayload {
                    technician_job_status_id: Some(technician_job_status_id),
                    ..echo_payload(&job)
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(error, JobFlowError::InvalidTechnicianJobStatus));
    }

    let stored = fixture.services.jobs.get_by_id(job.id).await.unwrap();
    assert_eq!(stored.technician_job_status_id, None);
}

#[tokio::test]
async fn test_unchanged_technician_status_is_not_resynchronized() {
    let fixture = Fixture::new();
    let job = fixture.open_job(&[7, 8]).await;
    let on_site = technician_status(&fixture, "On site", Some(8), true).await;

    let synced = fixture
        .services
        .jobs
        .update(
            job.id,
            &JobPayload {
                technician_job_status_id: Some(on_site),
                ..echo_payload(&job)
            },
        )
        .await
        .unwrap();
    assert_eq!(synced.job_status_id, 8);

    // Deactivating the technician status does not affect updates that keep it
    fixture
        .services
        .technician_job_statuses
        .update(
            on_site,
            &TechnicianJobStatusPayload {
                label: "On site".to_string(),
                job_status_id: Some(8),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let kept = fixture
        .services
        .jobs
        .update(
            job.id,
            &JobPayload {
                description: Some("checked in".to_string()),
                ..echo_payload(&synced)
            },
        )
        .await
        .unwrap();
    assert_eq!(kept.job_status_id, 8);
    assert_eq!(kept.description.as_deref(), Some("checked in"));
}

#[tokio::test]
async fn test_link_lookup_failure_is_not_fatal() {
    let store = Arc::new(InMemoryStore::new());
    let category_id = store.insert_job_category();
    let priority_id = store.insert_job_priority();
    let services = JobFlowServices::from_store(store.clone());
    let workflow = services
        .workflows
        .create(&WorkflowPayload {
            name: "HVAC".to_string(),
            status_ids: Some(vec![1, 2]),
            ..Default::default()
        })
        .await
        .unwrap();
    let customer_id = store.insert_customer(Some(workflow.id));
    let property_id = store.insert_property(customer_id);

    let failing = Arc::new(FailingLinkChecker::new(true));
    let jobs = JobService::new(
        JobCollaborators::from_store(store.clone()).with_technician_statuses(failing.clone()),
    );

    let job = jobs
        .create(&JobPayload {
            job_category_id: Some(category_id),
            job_priority_id: Some(priority_id),
            property_id: Some(property_id),
            ..Default::default()
        })
        .await
        .unwrap();

    let updated = jobs
        .update(
            job.id,
            &JobPayload {
                technician_job_status_id: Some(31),
                ..echo_payload(&job)
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.job_status_id, job.job_status_id);
    assert_eq!(updated.technician_job_status_id, Some(31));
    assert_eq!(*failing.link_calls.lock(), vec![31]);
}

#[tokio::test]
async fn test_synchronizer_outcomes() {
    let store = Arc::new(InMemoryStore::new());

    let linked = TechnicianJobStatusRepository::create(
        store.as_ref(),
        &NewTechnicianJobStatus {
            label: "Done".to_string(),
            class: None,
            job_status_id: Some(50),
            is_active: true,
        },
    )
    .await
    .unwrap();
    let unlinked = TechnicianJobStatusRepository::create(
        store.as_ref(),
        &NewTechnicianJobStatus {
            label: "Paused".to_string(),
            class: None,
            job_status_id: None,
            is_active: true,
        },
    )
    .await
    .unwrap();

    let synchronizer = StatusSynchronizer::new(store);
    let stored = Job {
        id: 1,
        job_status_id: 3,
        ..Job::default()
    };

    let mut untouched = stored.clone();
    assert_eq!(
        synchronizer.synchronize(&stored, &mut untouched).await.unwrap(),
        SyncOutcome::Unchanged
    );

    let mut incoming = Job {
        technician_job_status_id: Some(linked.id),
        ..stored.clone()
    };
    assert_eq!(
        synchronizer.synchronize(&stored, &mut incoming).await.unwrap(),
        SyncOutcome::Overridden { from: 3, to: 50 }
    );
    assert_eq!(incoming.job_status_id, 50);

    let mut incoming = Job {
        technician_job_status_id: Some(unlinked.id),
        ..stored.clone()
    };
    assert_eq!(
        synchronizer.synchronize(&stored, &mut incoming).await.unwrap(),
        SyncOutcome::NoLink
    );
    assert_eq!(incoming.job_status_id, 3);
}
