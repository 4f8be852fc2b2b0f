use super::workflow_status::WorkflowStatus;
use crate::constants::duplicate_workflow_name;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

/// Workflow is a named, ordered sequence of job statuses assigned to customers
/// Maps to `workflows` table; the sequence lives in `workflow_statuses`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: i64,
    pub name: String,
    pub notes: Option<String>,
    pub is_active: bool,
    #[sqlx(skip)]
    #[serde(default)]
    pub statuses: Vec<WorkflowStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validated field set for creating or replacing a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkflow {
    pub name: String,
    pub notes: Option<String>,
    pub is_active: bool,
}

impl Workflow {
    /// Create a new workflow without statuses
    pub async fn create(pool: &PgPool, new_workflow: &NewWorkflow) -> Result<Workflow, sqlx::Error> {
        sqlx::query_as::<_, Workflow>(
            r#"
            INSERT INTO workflows (name, notes, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING id, name, notes, is_active, created_at, updated_at, deleted_at
            "#,
        )
        .bind(&new_workflow.name)
        .bind(&new_workflow.notes)
        .bind(new_workflow.is_active)
        .fetch_one(pool)
        .await
    }

    /// Find a live (not soft-deleted) workflow by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Workflow>, sqlx::Error> {
        sqlx::query_as::<_, Workflow>(
            r#"
            SELECT id, name, notes, is_active, created_at, updated_at, deleted_at
            FROM workflows
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// List live workflows ordered by name
    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<Workflow>, sqlx::Error> {
        sqlx::query_as::<_, Workflow>(
            r#"
            SELECT id, name, notes, is_active, created_at, updated_at, deleted_at
            FROM workflows
            WHERE deleted_at IS NULL AND ($1 = FALSE OR is_active = TRUE)
            ORDER BY name, id
            "#,
        )
        .bind(active_only)
        .fetch_all(pool)
        .await
    }

    /// Replace the mutable fields of a live workflow
    pub async fn update(
        pool: &PgPool,
        id: i64,
        changes: &NewWorkflow,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        sqlx::query_as::<_, Workflow>(
            r#"
            UPDATE workflows
            SET name = $2, notes = $3, is_active = $4, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, notes, is_active, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.notes)
        .bind(changes.is_active)
        .fetch_optional(pool)
        .await
    }

    /// Soft-delete the workflow and hard-delete its sequence in one transaction
    pub async fn delete_with_statuses(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE workflows
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        WorkflowStatus::delete_by_workflow_with_transaction(&mut tx, id).await?;
        tx.commit().await?;

        Ok(true)
    }

    /// Copy a live workflow and its sequence
    ///
    /// The copy is inserted first, then renamed to `Copy of <name> (<new id>)`
    /// once its id is known, then receives the source's sequence with the same
    /// orders. Returns `None` when the source is missing.
    pub async fn duplicate(pool: &PgPool, id: i64) -> Result<Option<Workflow>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(source) = Self::find_by_id_with_transaction(&mut tx, id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        let inserted = sqlx::query_as::<_, Workflow>(
            r#"
            INSERT INTO workflows (name, notes, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING id, name, notes, is_active, created_at, updated_at, deleted_at
            "#,
        )
        .bind(&source.name)
        .bind(&source.notes)
        .bind(source.is_active)
        .fetch_one(&mut *tx)
        .await?;

        let mut copy = sqlx::query_as::<_, Workflow>(
            r#"
            UPDATE workflows
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, notes, is_active, created_at, updated_at, deleted_at
            "#,
        )
        .bind(inserted.id)
        .bind(duplicate_workflow_name(&source.name, inserted.id))
        .fetch_one(&mut *tx)
        .await?;

        WorkflowStatus::copy_with_transaction(&mut tx, source.id, copy.id).await?;
        copy.statuses = WorkflowStatus::find_by_workflow(&mut *tx, copy.id).await?;

        tx.commit().await?;
        Ok(Some(copy))
    }

    async fn find_by_id_with_transaction(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        sqlx::query_as::<_, Workflow>(
            r#"
            SELECT id, name, notes, is_active, created_at, updated_at, deleted_at
            FROM workflows
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Active flag only; soft-deletion is not considered
    pub async fn is_active_by_id(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM workflows WHERE id = $1 AND is_active = TRUE)",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
