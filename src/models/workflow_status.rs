//! # Workflow Status
//!
//! One position in a workflow's ordered status sequence.
//!
//! ## Ordering
//!
//! For a given workflow the `order` values are contiguous integers starting at
//! 0, in the order the caller supplied the status ids. Position 0 is the
//! initial status assigned to newly created jobs.
//!
//! The sequence is never diffed. Replacing it deletes every row for the
//! workflow and bulk-inserts the new rows inside one transaction, so readers
//! observe either the old sequence or the new one:
//!
//! ```sql
//! BEGIN;
//! DELETE FROM workflow_statuses WHERE workflow_id = $1;
//! INSERT INTO workflow_statuses (workflow_id, job_status_id, "order")
//! VALUES ($1, 100, 0), ($1, 200, 1), ($1, 300, 2);
//! COMMIT;
//! ```

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};

/// A workflow's status at a given position
/// Maps to `workflow_statuses` table, joined with `job_statuses` for the display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    pub workflow_id: i64,
    pub job_status_id: i64,
    pub order: i32,
    /// Label of the referenced job status; `None` when it no longer resolves
    pub status_name: Option<String>,
}

/// A row to insert when replacing a workflow's sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkflowStatus {
    pub job_status_id: i64,
    pub order: i32,
}

impl NewWorkflowStatus {
    /// Build a sequence from status ids, `order` being the index in `status_ids`
    ///
    /// Ids are neither sorted nor deduplicated; a repeated id occupies two
    /// positions.
    pub fn sequence_from_ids(status_ids: &[i64]) -> Vec<NewWorkflowStatus> {
        status_ids
            .iter()
            .enumerate()
            .map(|(index, job_status_id)| NewWorkflowStatus {
                job_status_id: *job_status_id,
                order: index as i32,
            })
            .collect()
    }
}

impl WorkflowStatus {
    /// Ordered sequence for a workflow with best-effort status names
    pub async fn find_by_workflow<'e, E: PgExecutor<'e>>(
        executor: E,
        workflow_id: i64,
    ) -> Result<Vec<WorkflowStatus>, sqlx::Error> {
        sqlx::query_as::<_, WorkflowStatus>(
            r#"
            SELECT ws.workflow_id, ws.job_status_id, ws."order", js.label AS status_name
            FROM workflow_statuses ws
            LEFT JOIN job_statuses js ON js.id = ws.job_status_id
            WHERE ws.workflow_id = $1
            ORDER BY ws."order"
            "#,
        )
        .bind(workflow_id)
        .fetch_all(executor)
        .await
    }

    /// Number of positions in a workflow's sequence
    pub async fn count_for_workflow(pool: &PgPool, workflow_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM workflow_statuses WHERE workflow_id = $1",
        )
        .bind(workflow_id)
        .fetch_one(pool)
        .await
    }

    /// Job status at position 0, if that position exists
    pub async fn initial_status_id(
        pool: &PgPool,
        workflow_id: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT job_status_id
            FROM workflow_statuses
            WHERE workflow_id = $1 AND "order" = 0
            "#,
        )
        .bind(workflow_id)
        .fetch_optional(pool)
        .await
    }

    /// Replace a workflow's whole sequence atomically
    pub async fn replace_for_workflow(
        pool: &PgPool,
        workflow_id: i64,
        statuses: &[NewWorkflowStatus],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::replace_with_transaction(&mut tx, workflow_id, statuses).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Delete-then-insert inside the caller's transaction
    pub async fn replace_with_transaction(
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: i64,
        statuses: &[NewWorkflowStatus],
    ) -> Result<(), sqlx::Error> {
        Self::delete_by_workflow_with_transaction(tx, workflow_id).await?;

        if statuses.is_empty() {
            return Ok(());
        }

        let mut insert: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"INSERT INTO workflow_statuses (workflow_id, job_status_id, "order") "#,
        );
        insert.push_values(statuses, |mut row, status| {
            row.push_bind(workflow_id)
                .push_bind(status.job_status_id)
                .push_bind(status.order);
        });
        insert.build().execute(&mut **tx).await?;

        Ok(())
    }

    /// Remove every position of a workflow inside the caller's transaction
    pub async fn delete_by_workflow_with_transaction(
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workflow_statuses WHERE workflow_id = $1")
            .bind(workflow_id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    /// Copy a sequence verbatim (same ids and orders) onto another workflow
    pub async fn copy_with_transaction(
        tx: &mut Transaction<'_, Postgres>,
        source_workflow_id: i64,
        target_workflow_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO workflow_statuses (workflow_id, job_status_id, "order")
            SELECT $2, job_status_id, "order"
            FROM workflow_statuses
            WHERE workflow_id = $1
            ORDER BY "order"
            "#,
        )
        .bind(source_workflow_id)
        .bind(target_workflow_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}
