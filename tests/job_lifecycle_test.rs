//! Job Lifecycle Tests
//!
//! Create/update/close/delete/list behaviour of `JobService` against the
//! in-memory store.

mod support;

use chrono::{TimeZone, Utc};
use jobflow_core::error::JobFlowError;
use jobflow_core::models::JobFilter;
use jobflow_core::services::{JobPayload, JobStatusPayload};
use support::{echo_payload, Fixture};

#[tokio::test]
async fn test_create_derives_workflow_and_initial_status() {
    let fixture = Fixture::new();
    let workflow = fixture.workflow("HVAC", &[100, 200, 300]).await;
    let property_id = fixture.property_for(Some(workflow.id));

    let job = fixture
        .services
        .jobs
        .create(&fixture.job_payload(property_id))
        .await
        .unwrap();

    assert_eq!(job.workflow_id, workflow.id);
    assert_eq!(job.job_status_id, 100);
    assert!(!job.closed);
    assert!(job.date_received.is_some());
}

#[tokio::test]
async fn test_create_ignores_client_workflow_and_status() {
    let fixture = Fixture::new();
    let workflow = fixture.workflow("HVAC", &[100, 200]).await;
    let other = fixture.workflow("Other", &[900]).await;
    let property_id = fixture.property_for(Some(workflow.id));

    let job = fixture
        .services
        .jobs
        .create(&JobPayload {
            workflow_id: Some(other.id),
            job_status_id: Some(900),
            ..fixture.job_payload(property_id)
        })
        .await
        .unwrap();

    assert_eq!(job.workflow_id, workflow.id);
    assert_eq!(job.job_status_id, 100);
}

#[tokio::test]
async fn test_create_required_fields() {
    let fixture = Fixture::new();
    let property_id = fixture.property_for(None);

    let cases = [
        (
            JobPayload {
                job_category_id: None,
                ..fixture.job_payload(property_id)
            },
            "jobCategoryId",
        ),
        (
            JobPayload {
                job_priority_id: Some(0),
                ..fixture.job_payload(property_id)
            },
            "jobPriorityId",
        ),
        (
            JobPayload {
                property_id: None,
                ..fixture.job_payload(property_id)
            },
            "propertyId",
        ),
    ];

    for (payload, field) in cases {
        let error = fixture.services.jobs.create(&payload).await.unwrap_err();
        assert_eq!(error.field(), Some(field));
        assert_eq!(error.http_status(), 400);
    }
}

#[tokio::test]
async fn test_create_check_order() {
    let fixture = Fixture::new();
    let no_workflow_property = fixture.property_for(None);

    // Category fails before priority and property
    let error = fixture
        .services
        .jobs
        .create(&JobPayload {
            job_category_id: Some(77),
            job_priority_id: Some(77),
            property_id: Some(77),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(error, JobFlowError::InvalidJobCategory));

    let error = fixture
        .services
        .jobs
        .create(&JobPayload {
            job_priority_id: Some(77),
            property_id: Some(77),
            ..fixture.job_payload(no_workflow_property)
        })
        .await
        .unwrap_err();
    assert!(matches!(error, JobFlowError::InvalidJobPriority));

    let error = fixture
        .services
        .jobs
        .create(&JobPayload {
            property_id: Some(77),
            ..fixture.job_payload(no_workflow_property)
        })
        .await
        .unwrap_err();
    assert!(matches!(error, JobFlowError::InvalidProperty));

    // Workflow resolution fails before the bad user is looked at
    let error = fixture
        .services
        .jobs
        .create(&JobPayload {
            user_id: Some(77),
            ..fixture.job_payload(no_workflow_property)
        })
        .await
        .unwrap_err();
    assert!(matches!(error, JobFlowError::InvalidWorkflow));
}

#[tokio::test]
async fn test_create_against_empty_workflow_fails() {
    let fixture = Fixture::new();
    let workflow = fixture.workflow("Empty", &[]).await;
    let property_id = fixture.property_for(Some(workflow.id));

    let error = fixture
        .services
        .jobs
        .create(&JobPayload {
            user_id: Some(77),
            ..fixture.job_payload(property_id)
        })
        .await
        .unwrap_err();

    assert!(matches!(error, JobFlowError::WorkflowHasNoStatuses));
    assert_eq!(error.http_status(), 500);
}

#[tokio::test]
async fn test_create_validates_user_and_normalizes_fields() {
    let fixture = Fixture::new();
    let workflow = fixture.workflow("HVAC", &[1]).await;
    let property_id = fixture.property_for(Some(workflow.id));

    let error = fixture
        .services
        .jobs
        .create(&JobPayload {
            user_id: Some(99),
            ..fixture.job_payload(property_id)
        })
        .await
        .unwrap_err();
    assert!(matches!(error, JobFlowError::InvalidUser));

    let user_id = fixture.store.insert_user();
    let received = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    let job = fixture
        .services
        .jobs
        .create(&JobPayload {
            user_id: Some(user_id),
            work_order: Some("   ".to_string()),
            date_received: Some(received),
            ..fixture.job_payload(property_id)
        })
        .await
        .unwrap();

    assert_eq!(job.user_id, Some(user_id));
    assert_eq!(job.work_order, None);
    assert_eq!(job.date_received, Some(received));

    let unassigned = fixture
        .services
        .jobs
        .create(&JobPayload {
            user_id: Some(0),
            work_order: Some(" WO-7 ".to_string()),
            ..fixture.job_payload(property_id)
        })
        .await
        .unwrap();
    assert_eq!(unassigned.user_id, None);
    assert_eq!(unassigned.work_order.as_deref(), Some("WO-7"));
}

#[tokio::test]
async fn test_update_accepts_echoed_values() {
    let fixture = Fixture::new();
    let job = fixture.open_job(&[1, 2]).await;

    // The stored category is gone, but an unchanged id is not revalidated
    fixture.store.remove_job_category(job.job_category_id);

    let updated = fixture
        .services
        .jobs
        .update(
            job.id,
            &JobPayload {
                description: Some("Replace filter".to_string()),
                ..echo_payload(&job)
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.description.as_deref(), Some("Replace filter"));
    assert_eq!(updated.job_category_id, job.job_category_id);
}

#[tokio::test]
async fn test_update_revalidates_changed_references() {
    let fixture = Fixture::new();
    let job = fixture.open_job(&[1, 2]).await;

    let cases = [
        (
            JobPayload {
                job_category_id: Some(55),
                ..echo_payload(&job)
            },
            "invalid job category",
        ),
        (
            JobPayload {
                job_priority_id: Some(55),
                ..echo_payload(&job)
            },
            "invalid job priority",
        ),
        (
            JobPayload {
                job_status_id: Some(55),
                ..echo_payload(&job)
            },
            "invalid job status",
        ),
        (
            JobPayload {
                workflow_id: Some(55),
                ..echo_payload(&job)
            },
            "invalid workflow",
        ),
        (
            JobPayload {
                user_id: Some(55),
                ..echo_payload(&job)
            },
            "invalid user",
        ),
    ];

    for (payload, message) in cases {
        let error = fixture
            .services
            .jobs
            .update(job.id, &payload)
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), message);
    }
}

#[tokio::test]
async fn test_update_applies_valid_changes() {
    let fixture = Fixture::new();
    let job = fixture.open_job(&[7, 8]).await;
    let in_progress = fixture
        .services
        .job_statuses
        .create(&JobStatusPayload {
            label: "In progress".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let priority_id = fixture.store.insert_job_priority();

    let updated = fixture
        .services
        .jobs
        .update(
            job.id,
            &JobPayload {
                job_status_id: Some(in_progress.id),
                job_priority_id: Some(priority_id),
                ..echo_payload(&job)
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.job_status_id, in_progress.id);
    assert_eq!(updated.job_priority_id, priority_id);
    assert_eq!(updated.workflow_id, job.workflow_id);
}

#[tokio::test]
async fn test_update_zero_ids_fall_back_to_stored() {
    let fixture = Fixture::new();
    let job = fixture.open_job(&[1, 2]).await;

    let updated = fixture
        .services
        .jobs
        .update(job.id, &JobPayload::default())
        .await
        .unwrap();

    assert_eq!(updated.workflow_id, job.workflow_id);
    assert_eq!(updated.job_status_id, job.job_status_id);
    assert_eq!(updated.job_category_id, job.job_category_id);
    assert_eq!(updated.property_id, job.property_id);
    assert_eq!(updated.date_received, job.date_received);
}

#[tokio::test]
async fn test_update_missing_or_unset_id() {
    let fixture = Fixture::new();

    let error = fixture
        .services
        .jobs
        .update(0, &JobPayload::default())
        .await
        .unwrap_err();
    assert_eq!(error.field(), Some("id"));

    assert!(matches!(
        fixture.services.jobs.update(12, &JobPayload::default()).await,
        Err(JobFlowError::JobNotFound)
    ));
}

#[tokio::test]
async fn test_close_is_terminal() {
    let fixture = Fixture::new();
    let job = fixture.open_job(&[1, 2]).await;

    let closed = fixture.services.jobs.close(job.id, None).await.unwrap();
    assert!(closed.closed);
    assert_eq!(closed.job_status_id, job.job_status_id);

    let error = fixture.services.jobs.close(job.id, None).await.unwrap_err();
    assert!(matches!(error, JobFlowError::JobAlreadyClosed));
    assert_eq!(error.http_status(), 409);

    // Update never reopens
    let updated = fixture
        .services
        .jobs
        .update(job.id, &echo_payload(&closed))
        .await
        .unwrap();
    assert!(updated.closed);
}

#[tokio::test]
async fn test_close_with_status() {
    let fixture = Fixture::new();
    let job = fixture.open_job(&[7, 8]).await;
    let complete = fixture
        .services
        .job_statuses
        .create(&JobStatusPayload {
            label: "Complete".to_string(),
            class: Some("green".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let error = fixture
        .services
        .jobs
        .close(job.id, Some(404))
        .await
        .unwrap_err();
    assert!(matches!(error, JobFlowError::InvalidJobStatus));
    assert!(!fixture.services.jobs.get_by_id(job.id).await.unwrap().closed);

    let closed = fixture
        .services
        .jobs
        .close(job.id, Some(complete.id))
        .await
        .unwrap();
    assert!(closed.closed);
    assert_eq!(closed.job_status_id, complete.id);
}

#[tokio::test]
async fn test_deleted_job_behaves_as_missing() {
    let fixture = Fixture::new();
    let job = fixture.open_job(&[1]).await;

    fixture.services.jobs.delete(job.id).await.unwrap();

    assert!(fixture.store.raw_job(job.id).unwrap().deleted_at.is_some());
    assert!(matches!(
        fixture.services.jobs.get_by_id(job.id).await,
        Err(JobFlowError::JobNotFound)
    ));
    assert!(matches!(
        fixture.services.jobs.update(job.id, &echo_payload(&job)).await,
        Err(JobFlowError::JobNotFound)
    ));
    assert!(matches!(
        fixture.services.jobs.delete(job.id).await,
        Err(JobFlowError::JobNotFound)
    ));
    assert!(matches!(
        fixture.services.jobs.close(job.id, None).await,
        Err(JobFlowError::JobNotFound)
    ));
}

#[tokio::test]
async fn test_list_filters_and_pages() {
    let fixture = Fixture::new();
    let hvac = fixture.workflow("HVAC", &[1, 2]).await;
    let plumbing = fixture.workflow("Plumbing", &[3]).await;
    let hvac_property = fixture.property_for(Some(hvac.id));
    let plumbing_property = fixture.property_for(Some(plumbing.id));

    let mut hvac_jobs = Vec::new();
    for day in 1..=3 {
        let job = fixture
            .services
            .jobs
            .create(&JobPayload {
                date_received: Some(Utc.with_ymd_and_hms(2024, 5, day, 8, 0, 0).unwrap()),
                ..fixture.job_payload(hvac_property)
            })
            .await
            .unwrap();
        hvac_jobs.push(job);
    }
    fixture
        .services
        .jobs
        .create(&fixture.job_payload(plumbing_property))
        .await
        .unwrap();
    fixture.services.jobs.close(hvac_jobs[0].id, None).await.unwrap();

    let filter = JobFilter {
        workflow_id: Some(hvac.id),
        ..Default::default()
    };
    let first = fixture
        .services
        .jobs
        .list(&filter, Some(1), Some(2))
        .await
        .unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(first.page_size, 2);
    // Newest first
    let ids: Vec<i64> = first.jobs.iter().map(|job| job.id).collect();
    assert_eq!(ids, vec![hvac_jobs[2].id, hvac_jobs[1].id]);

    let second = fixture
        .services
        .jobs
        .list(&filter, Some(2), Some(2))
        .await
        .unwrap();
    assert_eq!(second.jobs.len(), 1);
    assert_eq!(second.jobs[0].id, hvac_jobs[0].id);

    let open = fixture
        .services
        .jobs
        .list(
            &JobFilter {
                closed: Some(false),
                ..Default::default()
            },
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(open.total, 3);
    assert_eq!(open.page, 1);
    assert_eq!(open.page_size, 25);
}

#[tokio::test]
async fn test_list_caps_page_size() {
    let fixture = Fixture::new();
    let page = fixture
        .services
        .jobs
        .list(&JobFilter::default(), Some(0), Some(1_000))
        .await
        .unwrap();

    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 100);
    assert!(page.jobs.is_empty());
}

#[tokio::test]
async fn test_list_huge_page_returns_empty_page() {
    let fixture = Fixture::new();
    let property_id = fixture.property_for(Some(fixture.workflow("HVAC", &[1]).await.id));
    fixture
        .services
        .jobs
        .create(&fixture.job_payload(property_id))
        .await
        .unwrap();

    let page = fixture
        .services
        .jobs
        .list(&JobFilter::default(), Some(i64::MAX), None)
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.page, i64::MAX);
    assert!(page.jobs.is_empty());
}

#[tokio::test]
async fn test_list_rejects_inactive_workflow_filter() {
    let fixture = Fixture::new();
    let workflow = fixture.workflow("HVAC", &[1]).await;
    fixture
        .services
        .workflows
        .update(
            workflow.id,
            &jobflow_core::services::WorkflowPayload {
                name: "HVAC".to_string(),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let result = fixture
        .services
        .jobs
        .list(
            &JobFilter {
                workflow_id: Some(workflow.id),
                ..Default::default()
            },
            None,
            None,
        )
        .await;
    assert!(matches!(result, Err(JobFlowError::InvalidWorkflow)));

    let unknown = fixture
        .services
        .jobs
        .list(
            &JobFilter {
                workflow_id: Some(404),
                ..Default::default()
            },
            None,
            None,
        )
        .await;
    assert!(matches!(unknown, Err(JobFlowError::InvalidWorkflow)));
}
