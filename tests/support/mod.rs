//! Shared fixtures for the in-memory service tests

#![allow(dead_code)]

use jobflow_core::models::{Job, Workflow};
use jobflow_core::repositories::InMemoryStore;
use jobflow_core::services::{JobFlowServices, JobPayload, WorkflowPayload};
use std::sync::Arc;

pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub services: JobFlowServices,
    pub category_id: i64,
    pub priority_id: i64,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let category_id = store.insert_job_category();
        let priority_id = store.insert_job_priority();
        let services = JobFlowServices::from_store(store.clone());

        Self {
            store,
            services,
            category_id,
            priority_id,
        }
    }

    pub async fn workflow(&self, name: &str, status_ids: &[i64]) -> Workflow {
        self.services
            .workflows
            .create(&WorkflowPayload {
                name: name.to_string(),
                status_ids: Some(status_ids.to_vec()),
                ..Default::default()
            })
            .await
            .expect("workflow should be created")
    }

    /// Property whose customer is assigned `workflow_id`
    pub fn property_for(&self, workflow_id: Option<i64>) -> i64 {
        let customer_id = self.store.insert_customer(workflow_id);
        self.store.insert_property(customer_id)
    }

    pub fn job_payload(&self, property_id: i64) -> JobPayload {
        JobPayload {
            job_category_id: Some(self.category_id),
            job_priority_id: Some(self.priority_id),
            property_id: Some(property_id),
            ..Default::default()
        }
    }

    /// Open job on a fresh workflow with the given sequence
    pub async fn open_job(&self, status_ids: &[i64]) -> Job {
        let workflow = self.workflow("Service", status_ids).await;
        let property_id = self.property_for(Some(workflow.id));
        self.services
            .jobs
            .create(&self.job_payload(property_id))
            .await
            .expect("job should be created")
    }
}

/// Update payload echoing every stored field of `job`
pub fn echo_payload(job: &Job) -> JobPayload {
    JobPayload {
        workflow_id: Some(job.workflow_id),
        job_status_id: Some(job.job_status_id),
        technician_job_status_id: job.technician_job_status_id,
        job_category_id: Some(job.job_category_id),
        job_priority_id: Some(job.job_priority_id),
        property_id: Some(job.property_id),
        user_id: job.user_id,
        work_order: job.work_order.clone(),
        description: job.description.clone(),
        date_received: job.date_received,
    }
}

pub fn status_ids(workflow: &Workflow) -> Vec<(i64, i32)> {
    workflow
        .statuses
        .iter()
        .map(|status| (status.job_status_id, status.order))
        .collect()
}
