//! # Repositories
//!
//! The persistence and lookup seams the services depend on, with a Postgres
//! implementation and an in-process one.

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use traits::{
    JobCategoryChecker, JobPriorityChecker, JobRepository, JobStatusChecker, JobStatusRepository,
    PropertyChecker, TechnicianJobStatusChecker, TechnicianJobStatusRepository, UserChecker,
    WorkflowChecker, WorkflowRepository,
};

/// Every repository and checker a [`JobFlowServices`](crate::services::JobFlowServices)
/// wiring needs, provided by one store
pub trait JobFlowStore:
    WorkflowRepository
    + JobRepository
    + JobStatusRepository
    + TechnicianJobStatusRepository
    + JobCategoryChecker
    + JobPriorityChecker
    + JobStatusChecker
    + UserChecker
    + WorkflowChecker
    + PropertyChecker
    + TechnicianJobStatusChecker
{
}

impl<T> JobFlowStore for T where
    T: WorkflowRepository
        + JobRepository
        + JobStatusRepository
        + TechnicianJobStatusRepository
        + JobCategoryChecker
        + JobPriorityChecker
        + JobStatusChecker
        + UserChecker
        + WorkflowChecker
        + PropertyChecker
        + TechnicianJobStatusChecker
{
}
