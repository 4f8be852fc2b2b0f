//! # Error Types
//!
//! Every failure the job status engine can report, grouped by kind so that a
//! boundary (HTTP handler, CLI, queue consumer) can map them without matching
//! on messages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a [`JobFlowError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The addressed job or workflow is absent or soft-deleted
    NotFound,
    /// A referenced id does not resolve
    InvalidReference,
    /// The operation is invalid in the entity's current state
    StateConflict,
    /// A workflow exists but cannot produce an initial status
    ConfigurationGap,
    /// A mandatory field is missing or malformed
    Validation,
    /// Persistence or configuration failure with no business mapping
    Internal,
}

#[derive(Debug, Error)]
pub enum JobFlowError {
    #[error("job not found")]
    JobNotFound,

    #[error("workflow not found")]
    WorkflowNotFound,

    #[error("job status not found")]
    JobStatusNotFound,

    #[error("technician job status not found")]
    TechnicianJobStatusNotFound,

    #[error("invalid job category")]
    InvalidJobCategory,

    #[error("invalid job priority")]
    InvalidJobPriority,

    #[error("invalid job status")]
    InvalidJobStatus,

    #[error("invalid workflow")]
    InvalidWorkflow,

    #[error("invalid property")]
    InvalidProperty,

    #[error("invalid user")]
    InvalidUser,

    #[error("invalid technician job status")]
    InvalidTechnicianJobStatus,

    #[error("job is already closed")]
    JobAlreadyClosed,

    #[error("workflow has no statuses")]
    WorkflowHasNoStatuses,

    #[error("workflow name is required")]
    WorkflowNameRequired,

    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl JobFlowError {
    /// Create a field validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an opaque internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::JobNotFound
            | Self::WorkflowNotFound
            | Self::JobStatusNotFound
            | Self::TechnicianJobStatusNotFound => ErrorKind::NotFound,

            Self::InvalidJobCategory
            | Self::InvalidJobPriority
            | Self::InvalidJobStatus
            | Self::InvalidWorkflow
            | Self::InvalidProperty
            | Self::InvalidUser
            | Self::InvalidTechnicianJobStatus => ErrorKind::InvalidReference,

            Self::JobAlreadyClosed => ErrorKind::StateConflict,

            Self::WorkflowHasNoStatuses => ErrorKind::ConfigurationGap,

            Self::WorkflowNameRequired | Self::Validation { .. } => ErrorKind::Validation,

            Self::Database(_) | Self::Migration(_) | Self::Configuration(_) | Self::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// HTTP status code a request boundary should answer with
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidReference | ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::StateConflict => 409,
            ErrorKind::ConfigurationGap | ErrorKind::Internal => 500,
        }
    }

    /// Name of the offending field for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field.as_str()),
            Self::WorkflowNameRequired => Some("name"),
            _ => None,
        }
    }
}

/// Translate `RowNotFound` into the entity-specific not-found error, keeping
/// every other database failure opaque.
pub(crate) fn map_row_not_found(error: sqlx::Error, not_found: JobFlowError) -> JobFlowError {
    match error {
        sqlx::Error::RowNotFound => not_found,
        other => JobFlowError::Database(other),
    }
}

pub type Result<T> = std::result::Result<T, JobFlowError>;
