//! # Models
//!
//! Persisted entities of the job status engine, one file per table, each with
//! its creation struct and Postgres queries.

pub mod job;
pub mod job_status;
pub mod reference;
pub mod technician_job_status;
pub mod workflow;
pub mod workflow_status;

pub use job::{Job, JobFilter, JobPage, NewJob};
pub use job_status::{JobStatus, NewJobStatus};
pub use reference::ReferenceLookup;
pub use technician_job_status::{NewTechnicianJobStatus, TechnicianJobStatus};
pub use workflow::{NewWorkflow, Workflow};
pub use workflow_status::{NewWorkflowStatus, WorkflowStatus};
