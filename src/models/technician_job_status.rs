use crate::constants::StatusClass;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// TechnicianJobStatus is the status a technician reports from the field
/// Maps to `technician_job_statuses` table
///
/// `job_status_id` optionally links to the primary [`JobStatus`](super::JobStatus)
/// a job should move to when its technician status becomes this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianJobStatus {
    pub id: i64,
    pub label: String,
    pub class: Option<StatusClass>,
    pub job_status_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated field set for creating or replacing a technician job status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTechnicianJobStatus {
    pub label: String,
    pub class: Option<StatusClass>,
    pub job_status_id: Option<i64>,
    pub is_active: bool,
}

impl TechnicianJobStatus {
    /// Create a new technician job status
    pub async fn create(
        pool: &PgPool,
        new_status: &NewTechnicianJobStatus,
    ) -> Result<TechnicianJobStatus, sqlx::Error> {
        sqlx::query_as::<_, TechnicianJobStatus>(
            r#"
            INSERT INTO technician_job_statuses (label, class, job_status_id, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING id, label, class, job_status_id, is_active, created_at, updated_at
            "#,
        )
        .bind(&new_status.label)
        .bind(new_status.class)
        .bind(new_status.job_status_id)
        .bind(new_status.is_active)
        .fetch_one(pool)
        .await
    }

    /// Find a technician job status by ID
    pub async fn find_by_id(
        pool: &PgPool,
        id: i64,
    ) -> Result<Option<TechnicianJobStatus>, sqlx::Error> {
        sqlx::query_as::<_, TechnicianJobStatus>(
            r#"
            SELECT id, label, class, job_status_id, is_active, created_at, updated_at
            FROM technician_job_statuses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(
        pool: &PgPool,
        active_only: bool,
    ) -> Result<Vec<TechnicianJobStatus>, sqlx::Error> {
        sqlx::query_as::<_, TechnicianJobStatus>(
            r#"
            SELECT id, label, class, job_status_id, is_active, created_at, updated_at
            FROM technician_job_statuses
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY label, id
            "#,
        )
        .bind(active_only)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        changes: &NewTechnicianJobStatus,
    ) -> Result<Option<TechnicianJobStatus>, sqlx::Error> {
        sqlx::query_as::<_, TechnicianJobStatus>(
            r#"
            UPDATE technician_job_statuses
            SET label = $2, class = $3, job_status_id = $4, is_active = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, label, class, job_status_id, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.label)
        .bind(changes.class)
        .bind(changes.job_status_id)
        .bind(changes.is_active)
        .fetch_optional(pool)
        .await
    }

    /// Hard delete; jobs pointing at this status are not checked
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM technician_job_statuses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// True only when the status exists and is active
    pub async fn is_active_by_id(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM technician_job_statuses WHERE id = $1 AND is_active = TRUE
            )
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Linked job status; `RowNotFound` when the technician status is missing
    pub async fn linked_job_status_id(pool: &PgPool, id: i64) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<i64>>(
            "SELECT job_status_id FROM technician_job_statuses WHERE id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
