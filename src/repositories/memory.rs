//! # In-Memory Store
//!
//! Process-local implementation of every repository and checker trait.
//!
//! All state sits behind one `parking_lot::Mutex`, so each trait call observes
//! and mutates the store as a single unit: a sequence replace or a workflow
//! delete is never half-applied. Ids are assigned per table, starting at 1.
//!
//! Reference data owned by the surrounding system (categories, priorities,
//! users, customers, properties) is seeded through the `insert_*` helpers.

use super::traits::{
    JobCategoryChecker, JobPriorityChecker, JobRepository, JobStatusChecker, JobStatusRepository,
    PropertyChecker, TechnicianJobStatusChecker, TechnicianJobStatusRepository, UserChecker,
    WorkflowChecker, WorkflowRepository,
};
use crate::constants::duplicate_workflow_name;
use crate::error::{JobFlowError, Result};
use crate::models::{
    Job, JobFilter, JobPage, JobStatus, NewJob, NewJobStatus, NewTechnicianJobStatus, NewWorkflow,
    NewWorkflowStatus, TechnicianJobStatus, Workflow, WorkflowStatus,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};

/// Per-table id counters
#[derive(Debug, Default)]
struct IdSequences {
    job_statuses: i64,
    technician_job_statuses: i64,
    workflows: i64,
    jobs: i64,
    job_categories: i64,
    job_priorities: i64,
    users: i64,
    customers: i64,
    properties: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default)]
struct StoreState {
    ids: IdSequences,
    job_statuses: BTreeMap<i64, JobStatus>,
    technician_job_statuses: BTreeMap<i64, TechnicianJobStatus>,
    workflows: BTreeMap<i64, Workflow>,
    /// Sequence rows per workflow, kept sorted by order
    workflow_statuses: BTreeMap<i64, Vec<NewWorkflowStatus>>,
    jobs: BTreeMap<i64, Job>,
    job_categories: BTreeSet<i64>,
    job_priorities: BTreeSet<i64>,
    users: BTreeSet<i64>,
    /// Customer id to its assigned workflow
    customers: BTreeMap<i64, Option<i64>>,
    /// Property id to its owning customer
    properties: BTreeMap<i64, i64>,
}

impl StoreState {
    fn live_workflow(&self, id: i64) -> Option<&Workflow> {
        self.workflows
            .get(&id)
            .filter(|workflow| workflow.deleted_at.is_none())
    }

    fn live_job(&self, id: i64) -> Option<&Job> {
        self.jobs.get(&id).filter(|job| job.deleted_at.is_none())
    }

    fn sequence_for(&self, workflow_id: i64) -> Vec<WorkflowStatus> {
        self.workflow_statuses
            .get(&workflow_id)
            .map(|rows| {
                rows.iter()
                    .map(|row| WorkflowStatus {
                        workflow_id,
                        job_status_id: row.job_status_id,
                        order: row.order,
                        status_name: self
                            .job_statuses
                            .get(&row.job_status_id)
                            .map(|status| status.label.clone()),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn replace_sequence(&mut self, workflow_id: i64, statuses: &[NewWorkflowStatus]) -> Result<()> {
        let mut rows = statuses.to_vec();
        rows.sort_by_key(|row| row.order);

        // Mirrors UNIQUE (workflow_id, "order")
        if rows.windows(2).any(|pair| pair[0].order == pair[1].order) {
            return Err(JobFlowError::validation(
                "statusIds",
                "workflow status orders must be unique",
            ));
        }

        // Mirrors the workflow_statuses.workflow_id foreign key
        if !rows.is_empty() && !self.workflows.contains_key(&workflow_id) {
            return Err(JobFlowError::WorkflowNotFound);
        }

        if rows.is_empty() {
            self.workflow_statuses.remove(&workflow_id);
        } else {
            self.workflow_statuses.insert(workflow_id, rows);
        }
        Ok(())
    }
}

/// Embedded store for tests, tools and demos
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_job_category(&self) -> i64 {
        let mut state = self.state.lock();
        let id = next_id(&mut state.ids.job_categories);
        state.job_categories.insert(id);
        id
    }

    pub fn insert_job_priority(&self) -> i64 {
        let mut state = self.state.lock();
        let id = next_id(&mut state.ids.job_priorities);
        state.job_priorities.insert(id);
        id
    }

    pub fn insert_user(&self) -> i64 {
        let mut state = self.state.lock();
        let id = next_id(&mut state.ids.users);
        state.users.insert(id);
        id
    }

    /// Customer optionally assigned to a workflow
    pub fn insert_customer(&self, workflow_id: Option<i64>) -> i64 {
        let mut state = self.state.lock();
        let id = next_id(&mut state.ids.customers);
        state.customers.insert(id, workflow_id);
        id
    }

    pub fn insert_property(&self, customer_id: i64) -> i64 {
        let mut state = self.state.lock();
        let id = next_id(&mut state.ids.properties);
        state.properties.insert(id, customer_id);
        id
    }

    /// Reassign a customer's workflow
    pub fn assign_customer_workflow(&self, customer_id: i64, workflow_id: Option<i64>) {
        self.state.lock().customers.insert(customer_id, workflow_id);
    }

    pub fn remove_job_category(&self, id: i64) {
        self.state.lock().job_categories.remove(&id);
    }

    /// Stored job including soft-deleted rows
    pub fn raw_job(&self, id: i64) -> Option<Job> {
        self.state.lock().jobs.get(&id).cloned()
    }

    /// Stored workflow including soft-deleted rows
    pub fn raw_workflow(&self, id: i64) -> Option<Workflow> {
        self.state.lock().workflows.get(&id).cloned()
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryStore {
    async fn get_by_id(&self, id: i64) -> Result<Workflow> {
        self.state
            .lock()
            .live_workflow(id)
            .cloned()
            .ok_or(JobFlowError::WorkflowNotFound)
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Workflow>> {
        let state = self.state.lock();
        let mut workflows: Vec<Workflow> = state
            .workflows
            .values()
            .filter(|workflow| workflow.deleted_at.is_none())
            .filter(|workflow| !active_only || workflow.is_active)
            .cloned()
            .collect();
        workflows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(workflows)
    }

    async fn create(&self, workflow: &NewWorkflow) -> Result<Workflow> {
        let mut state = self.state.lock();
        let now = Utc::now();
        let created = Workflow {
            id: next_id(&mut state.ids.workflows),
            name: workflow.name.clone(),
            notes: workflow.notes.clone(),
            is_active: workflow.is_active,
            statuses: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.workflows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, workflow: &NewWorkflow) -> Result<Workflow> {
        let mut state = self.state.lock();
        let stored = state
            .workflows
            .get_mut(&id)
            .filter(|stored| stored.deleted_at.is_none())
            .ok_or(JobFlowError::WorkflowNotFound)?;

        stored.name = workflow.name.clone();
        stored.notes = workflow.notes.clone();
        stored.is_active = workflow.is_active;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut state = self.state.lock();
        let stored = state
            .workflows
            .get_mut(&id)
            .filter(|stored| stored.deleted_at.is_none())
            .ok_or(JobFlowError::WorkflowNotFound)?;

        let now = Utc::now();
        stored.deleted_at = Some(now);
        stored.updated_at = now;
        state.workflow_statuses.remove(&id);
        Ok(())
    }

    async fn duplicate(&self, id: i64) -> Result<Workflow> {
        let mut state = self.state.lock();
        let source = state
            .live_workflow(id)
            .cloned()
            .ok_or(JobFlowError::WorkflowNotFound)?;

        let now = Utc::now();
        let copy_id = next_id(&mut state.ids.workflows);
        let mut copy = Workflow {
            id: copy_id,
            name: duplicate_workflow_name(&source.name, copy_id),
            notes: source.notes.clone(),
            is_active: source.is_active,
            statuses: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.workflows.insert(copy_id, copy.clone());

        if let Some(rows) = state.workflow_statuses.get(&source.id).cloned() {
            state.workflow_statuses.insert(copy_id, rows);
        }
        copy.statuses = state.sequence_for(copy_id);
        Ok(copy)
    }

    async fn is_active(&self, id: i64) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .workflows
            .get(&id)
            .is_some_and(|workflow| workflow.is_active))
    }

    async fn get_workflow_statuses(&self, workflow_id: i64) -> Result<Vec<WorkflowStatus>> {
        Ok(self.state.lock().sequence_for(workflow_id))
    }

    async fn set_workflow_statuses(
        &self,
        workflow_id: i64,
        statuses: &[NewWorkflowStatus],
    ) -> Result<()> {
        self.state.lock().replace_sequence(workflow_id, statuses)
    }
}

#[async_trait]
impl JobRepository for InMemoryStore {
    async fn create(&self, job: &NewJob) -> Result<Job> {
        let mut state = self.state.lock();
        let now = Utc::now();
        let created = Job {
            id: next_id(&mut state.ids.jobs),
            workflow_id: job.workflow_id,
            job_status_id: job.job_status_id,
            technician_job_status_id: job.technician_job_status_id,
            job_category_id: job.job_category_id,
            job_priority_id: job.job_priority_id,
            property_id: job.property_id,
            user_id: job.user_id,
            work_order: job.work_order.clone(),
            description: job.description.clone(),
            closed: false,
            date_received: Some(job.date_received),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.jobs.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Job> {
        self.state
            .lock()
            .live_job(id)
            .cloned()
            .ok_or(JobFlowError::JobNotFound)
    }

    async fn list(&self, filter: &JobFilter, page: i64, page_size: i64) -> Result<JobPage> {
        let state = self.state.lock();
        let mut matching: Vec<&Job> = state.jobs.values().filter(|job| filter.matches(job)).collect();
        matching.sort_by(|a, b| {
            b.date_received
                .cmp(&a.date_received)
                .then(b.id.cmp(&a.id))
        });

        let offset =
            usize::try_from((page - 1).max(0).saturating_mul(page_size)).unwrap_or(usize::MAX);
        let limit = usize::try_from(page_size).unwrap_or(0);
        Ok(JobPage {
            total: matching.len() as i64,
            jobs: matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
            page,
            page_size,
        })
    }

    async fn update(&self, job: &Job) -> Result<Job> {
        let mut state = self.state.lock();
        let stored = state
            .jobs
            .get_mut(&job.id)
            .filter(|stored| stored.deleted_at.is_none())
            .ok_or(JobFlowError::JobNotFound)?;

        stored.workflow_id = job.workflow_id;
        stored.job_status_id = job.job_status_id;
        stored.technician_job_status_id = job.technician_job_status_id;
        stored.job_category_id = job.job_category_id;
        stored.job_priority_id = job.job_priority_id;
        stored.property_id = job.property_id;
        stored.user_id = job.user_id;
        stored.work_order = job.work_order.clone();
        stored.description = job.description.clone();
        if job.date_received.is_some() {
            stored.date_received = job.date_received;
        }
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut state = self.state.lock();
        let stored = state
            .jobs
            .get_mut(&id)
            .filter(|stored| stored.deleted_at.is_none())
            .ok_or(JobFlowError::JobNotFound)?;

        let now = Utc::now();
        stored.deleted_at = Some(now);
        stored.updated_at = now;
        Ok(())
    }

    async fn close(&self, id: i64, job_status_id: Option<i64>) -> Result<Job> {
        let mut state = self.state.lock();
        let stored = state
            .jobs
            .get_mut(&id)
            .filter(|stored| stored.deleted_at.is_none())
            .ok_or(JobFlowError::JobNotFound)?;

        if stored.closed {
            return Err(JobFlowError::JobAlreadyClosed);
        }
        stored.closed = true;
        if let Some(job_status_id) = job_status_id {
            stored.job_status_id = job_status_id;
        }
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }
}

#[async_trait]
impl JobStatusRepository for InMemoryStore {
    async fn create(&self, status: &NewJobStatus) -> Result<JobStatus> {
        let mut state = self.state.lock();
        let now = Utc::now();
        let created = JobStatus {
            id: next_id(&mut state.ids.job_statuses),
            label: status.label.clone(),
            class: status.class,
            is_active: status.is_active,
            created_at: now,
            updated_at: now,
        };
        state.job_statuses.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<JobStatus> {
        self.state
            .lock()
            .job_statuses
            .get(&id)
            .cloned()
            .ok_or(JobFlowError::JobStatusNotFound)
    }

    async fn list(&self, active_only: bool) -> Result<Vec<JobStatus>> {
        let state = self.state.lock();
        let mut statuses: Vec<JobStatus> = state
            .job_statuses
            .values()
            .filter(|status| !active_only || status.is_active)
            .cloned()
            .collect();
        statuses.sort_by(|a, b| a.label.cmp(&b.label).then(a.id.cmp(&b.id)));
        Ok(statuses)
    }

    async fn update(&self, id: i64, status: &NewJobStatus) -> Result<JobStatus> {
        let mut state = self.state.lock();
        let stored = state
            .job_statuses
            .get_mut(&id)
            .ok_or(JobFlowError::JobStatusNotFound)?;

        stored.label = status.label.clone();
        stored.class = status.class;
        stored.is_active = status.is_active;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.state
            .lock()
            .job_statuses
            .remove(&id)
            .map(|_| ())
            .ok_or(JobFlowError::JobStatusNotFound)
    }
}

#[async_trait]
impl TechnicianJobStatusRepository for InMemoryStore {
    async fn create(&self, status: &NewTechnicianJobStatus) -> Result<TechnicianJobStatus> {
        let mut state = self.state.lock();
        let now = Utc::now();
        let created = TechnicianJobStatus {
            id: next_id(&mut state.ids.technician_job_statuses),
            label: status.label.clone(),
            class: status.class,
            job_status_id: status.job_status_id,
            is_active: status.is_active,
            created_at: now,
            updated_at: now,
        };
        state
            .technician_job_statuses
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<TechnicianJobStatus> {
        self.state
            .lock()
            .technician_job_statuses
            .get(&id)
            .cloned()
            .ok_or(JobFlowError::TechnicianJobStatusNotFound)
    }

    async fn list(&self, active_only: bool) -> Result<Vec<TechnicianJobStatus>> {
        let state = self.state.lock();
        let mut statuses: Vec<TechnicianJobStatus> = state
            .technician_job_statuses
            .values()
            .filter(|status| !active_only || status.is_active)
            .cloned()
            .collect();
        statuses.sort_by(|a, b| a.label.cmp(&b.label).then(a.id.cmp(&b.id)));
        Ok(statuses)
    }

    async fn update(
        &self,
        id: i64,
        status: &NewTechnicianJobStatus,
    ) -> Result<TechnicianJobStatus> {
        let mut state = self.state.lock();
        let stored = state
            .technician_job_statuses
            .get_mut(&id)
            .ok_or(JobFlowError::TechnicianJobStatusNotFound)?;

        stored.label = status.label.clone();
        stored.class = status.class;
        stored.job_status_id = status.job_status_id;
        stored.is_active = status.is_active;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.state
            .lock()
            .technician_job_statuses
            .remove(&id)
            .map(|_| ())
            .ok_or(JobFlowError::TechnicianJobStatusNotFound)
    }
}

#[async_trait]
impl JobCategoryChecker for InMemoryStore {
    async fn job_category_exists(&self, id: i64) -> Result<bool> {
        Ok(self.state.lock().job_categories.contains(&id))
    }
}

#[async_trait]
impl JobPriorityChecker for InMemoryStore {
    async fn job_priority_exists(&self, id: i64) -> Result<bool> {
        Ok(self.state.lock().job_priorities.contains(&id))
    }
}

#[async_trait]
impl JobStatusChecker for InMemoryStore {
    async fn job_status_exists(&self, id: i64) -> Result<bool> {
        Ok(self.state.lock().job_statuses.contains_key(&id))
    }
}

#[async_trait]
impl UserChecker for InMemoryStore {
    async fn user_exists(&self, id: i64) -> Result<bool> {
        Ok(self.state.lock().users.contains(&id))
    }
}

#[async_trait]
impl WorkflowChecker for InMemoryStore {
    async fn workflow_exists(&self, id: i64) -> Result<bool> {
        Ok(self.state.lock().live_workflow(id).is_some())
    }

    async fn workflow_is_active(&self, id: i64) -> Result<bool> {
        WorkflowRepository::is_active(self, id).await
    }

    async fn initial_status_id(&self, workflow_id: i64) -> Result<i64> {
        let state = self.state.lock();
        let rows = state
            .workflow_statuses
            .get(&workflow_id)
            .filter(|rows| !rows.is_empty())
            .ok_or(JobFlowError::WorkflowHasNoStatuses)?;

        rows.iter()
            .find(|row| row.order == 0)
            .map(|row| row.job_status_id)
            .ok_or(JobFlowError::InvalidJobStatus)
    }
}

#[async_trait]
impl PropertyChecker for InMemoryStore {
    async fn property_exists(&self, id: i64) -> Result<bool> {
        Ok(self.state.lock().properties.contains_key(&id))
    }

    async fn workflow_id_for_property(&self, property_id: i64) -> Result<Option<i64>> {
        let state = self.state.lock();
        Ok(state
            .properties
            .get(&property_id)
            .and_then(|customer_id| state.customers.get(customer_id))
            .copied()
            .flatten())
    }
}

#[async_trait]
impl TechnicianJobStatusChecker for InMemoryStore {
    async fn technician_job_status_is_active(&self, id: i64) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .technician_job_statuses
            .get(&id)
            .is_some_and(|status| status.is_active))
    }

    async fn linked_job_status_id(&self, id: i64) -> Result<Option<i64>> {
        self.state
            .lock()
            .technician_job_statuses
            .get(&id)
            .map(|status| status.job_status_id)
            .ok_or(JobFlowError::TechnicianJobStatusNotFound)
    }
}
