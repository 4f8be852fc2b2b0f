use crate::constants::StatusClass;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// JobStatus is a primary, customer-defined status a job moves through
/// Maps to `job_statuses` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub id: i64,
    pub label: String,
    pub class: Option<StatusClass>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated field set for creating or replacing a job status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJobStatus {
    pub label: String,
    pub class: Option<StatusClass>,
    pub is_active: bool,
}

impl JobStatus {
    /// Create a new job status
    pub async fn create(pool: &PgPool, new_status: &NewJobStatus) -> Result<JobStatus, sqlx::Error> {
        sqlx::query_as::<_, JobStatus>(
            r#"
            INSERT INTO job_statuses (label, class, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING id, label, class, is_active, created_at, updated_at
            "#,
        )
        .bind(&new_status.label)
        .bind(new_status.class)
        .bind(new_status.is_active)
        .fetch_one(pool)
        .await
    }

    /// Find a job status by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<JobStatus>, sqlx::Error> {
        sqlx::query_as::<_, JobStatus>(
            r#"
            SELECT id, label, class, is_active, created_at, updated_at
            FROM job_statuses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// List job statuses ordered by label
    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<JobStatus>, sqlx::Error> {
        sqlx::query_as::<_, JobStatus>(
            r#"
            SELECT id, label, class, is_active, created_at, updated_at
            FROM job_statuses
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY label, id
            "#,
        )
        .bind(active_only)
        .fetch_all(pool)
        .await
    }

    /// Replace the mutable fields of a job status
    pub async fn update(
        pool: &PgPool,
        id: i64,
        changes: &NewJobStatus,
    ) -> Result<Option<JobStatus>, sqlx::Error> {
        sqlx::query_as::<_, JobStatus>(
            r#"
            UPDATE job_statuses
            SET label = $2, class = $3, is_active = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, label, class, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.label)
        .bind(changes.class)
        .bind(changes.is_active)
        .fetch_optional(pool)
        .await
    }

    /// Hard delete; workflows, jobs and technician links are not checked
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM job_statuses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check whether a job status exists
    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM job_statuses WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
