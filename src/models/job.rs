//! # Job
//!
//! A field-service job tracked through its workflow's statuses.
//!
//! `workflow_id` and the initial `job_status_id` are derived at creation time
//! and never taken from the client. `closed` is set only by
//! [`Job::close`]; `deleted_at` only by [`Job::soft_delete`]. Every read filters
//! soft-deleted rows, so a deleted job behaves exactly like a missing one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

const JOB_COLUMNS: &str = "id, workflow_id, job_status_id, technician_job_status_id, \
     job_category_id, job_priority_id, property_id, user_id, work_order, description, \
     closed, date_received, created_at, updated_at, deleted_at";

/// Maps to `jobs` table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct Job {
    pub id: i64,
    pub workflow_id: i64,
    pub job_status_id: i64,
    pub technician_job_status_id: Option<i64>,
    pub job_category_id: i64,
    pub job_priority_id: i64,
    pub property_id: i64,
    pub user_id: Option<i64>,
    pub work_order: Option<String>,
    pub description: Option<String>,
    pub closed: bool,
    pub date_received: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fully resolved job ready for insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJob {
    pub workflow_id: i64,
    pub job_status_id: i64,
    pub technician_job_status_id: Option<i64>,
    pub job_category_id: i64,
    pub job_priority_id: i64,
    pub property_id: i64,
    pub user_id: Option<i64>,
    pub work_order: Option<String>,
    pub description: Option<String>,
    pub date_received: DateTime<Utc>,
}

/// Optional equality filters for listing jobs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobFilter {
    pub workflow_id: Option<i64>,
    pub job_status_id: Option<i64>,
    pub technician_job_status_id: Option<i64>,
    pub property_id: Option<i64>,
    pub user_id: Option<i64>,
    pub closed: Option<bool>,
}

/// One page of a job listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl JobFilter {
    fn push_conditions<'a>(&'a self, query: &mut QueryBuilder<'a, Postgres>) {
        query.push(" WHERE deleted_at IS NULL");

        let id_conditions = [
            ("workflow_id", self.workflow_id),
            ("job_status_id", self.job_status_id),
            ("technician_job_status_id", self.technician_job_status_id),
            ("property_id", self.property_id),
            ("user_id", self.user_id),
        ];
        for (column, value) in id_conditions {
            if let Some(value) = value {
                query.push(format!(" AND {column} = ")).push_bind(value);
            }
        }

        if let Some(closed) = self.closed {
            query.push(" AND closed = ").push_bind(closed);
        }
    }

    /// In-process equivalent of the SQL conditions
    pub fn matches(&self, job: &Job) -> bool {
        job.deleted_at.is_none()
            && self.workflow_id.map_or(true, |id| job.workflow_id == id)
            && self.job_status_id.map_or(true, |id| job.job_status_id == id)
            && self
                .technician_job_status_id
                .map_or(true, |id| job.technician_job_status_id == Some(id))
            && self.property_id.map_or(true, |id| job.property_id == id)
            && self.user_id.map_or(true, |id| job.user_id == Some(id))
            && self.closed.map_or(true, |closed| job.closed == closed)
    }
}

impl Job {
    /// Insert a resolved job
    pub async fn create(pool: &PgPool, new_job: &NewJob) -> Result<Job, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO jobs (
                workflow_id, job_status_id, technician_job_status_id, job_category_id,
                job_priority_id, property_id, user_id, work_order, description,
                closed, date_received, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE, $10, NOW(), NOW())
            RETURNING {JOB_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Job>(&sql)
            .bind(new_job.workflow_id)
            .bind(new_job.job_status_id)
            .bind(new_job.technician_job_status_id)
            .bind(new_job.job_category_id)
            .bind(new_job.job_priority_id)
            .bind(new_job.property_id)
            .bind(new_job.user_id)
            .bind(&new_job.work_order)
            .bind(&new_job.description)
            .bind(new_job.date_received)
            .fetch_one(pool)
            .await
    }

    /// Find a job that has not been soft-deleted
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Job>, sqlx::Error> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1 AND deleted_at IS NULL");

        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of jobs matching `filter`, newest first
    pub async fn list(
        pool: &PgPool,
        filter: &JobFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {JOB_COLUMNS} FROM jobs"));
        filter.push_conditions(&mut query);
        query
            .push(" ORDER BY date_received DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        query.build_query_as::<Job>().fetch_all(pool).await
    }

    /// Number of jobs matching `filter`
    pub async fn count(pool: &PgPool, filter: &JobFilter) -> Result<i64, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM jobs");
        filter.push_conditions(&mut query);

        query.build_query_scalar::<i64>().fetch_one(pool).await
    }

    /// Persist the mutable fields of a live job
    ///
    /// `closed`, `created_at` and `deleted_at` are never written here.
    pub async fn update(pool: &PgPool, job: &Job) -> Result<Option<Job>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE jobs
            SET workflow_id = $2,
                job_status_id = $3,
                technician_job_status_id = $4,
                job_category_id = $5,
                job_priority_id = $6,
                property_id = $7,
                user_id = $8,
                work_order = $9,
                description = $10,
                date_received = COALESCE($11, date_received),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {JOB_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Job>(&sql)
            .bind(job.id)
            .bind(job.workflow_id)
            .bind(job.job_status_id)
            .bind(job.technician_job_status_id)
            .bind(job.job_category_id)
            .bind(job.job_priority_id)
            .bind(job.property_id)
            .bind(job.user_id)
            .bind(&job.work_order)
            .bind(&job.description)
            .bind(job.date_received)
            .fetch_optional(pool)
            .await
    }

    /// Close an open job, optionally moving it to `job_status_id`, in one write
    ///
    /// Returns `None` when the job is missing, deleted, or already closed.
    pub async fn close(
        pool: &PgPool,
        id: i64,
        job_status_id: Option<i64>,
    ) -> Result<Option<Job>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE jobs
            SET closed = TRUE,
                job_status_id = COALESCE($2, job_status_id),
                updated_at = NOW()
            WHERE id = $1 AND closed = FALSE AND deleted_at IS NULL
            RETURNING {JOB_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(job_status_id)
            .fetch_optional(pool)
            .await
    }

    /// Stamp `deleted_at`; the row is kept
    pub async fn soft_delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
