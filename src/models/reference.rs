//! Read-only lookups against reference data owned by the surrounding system
//! (categories, priorities, users, customers, properties).

use sqlx::PgPool;

/// Existence checks and the property → customer → workflow chain
pub struct ReferenceLookup;

impl ReferenceLookup {
    pub async fn job_category_exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM job_categories WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    pub async fn job_priority_exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM job_priorities WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    pub async fn user_exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    pub async fn property_exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM properties WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Workflow of the customer owning a property
    ///
    /// `None` when the property or customer is missing or the customer has no
    /// workflow assigned.
    pub async fn workflow_id_for_property(
        pool: &PgPool,
        property_id: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        let workflow_id = sqlx::query_scalar::<_, Option<i64>>(
            r#"
            SELECT c.workflow_id
            FROM properties p
            INNER JOIN customers c ON c.id = p.customer_id AND c.deleted_at IS NULL
            WHERE p.id = $1 AND p.deleted_at IS NULL
            "#,
        )
        .bind(property_id)
        .fetch_optional(pool)
        .await?;

        Ok(workflow_id.flatten())
    }
}
