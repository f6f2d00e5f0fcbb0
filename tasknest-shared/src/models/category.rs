/// Category model and database operations
///
/// Categories are user-owned labels optionally attached to tasks. Only the
/// creator may rename or delete a category, but a category attached to a
/// task in a shared list is readable by everyone with access to that list —
/// otherwise filter controls would offer IDs the user cannot resolve.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE categories (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Tasks reference categories through a nullable `category_id` with
/// `ON DELETE SET NULL`: deleting a category detaches it from its tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Category model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category ID
    pub id: Uuid,

    /// Category name
    pub name: String,

    /// Creating user; the only user allowed to rename or delete it
    pub created_by: Uuid,

    /// When the category was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    /// Category name
    pub name: String,

    /// Creating user
    pub created_by: Uuid,
}

impl Category {
    /// Creates a new category
    pub async fn create(pool: &PgPool, data: CreateCategory) -> Result<Self, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, created_by)
            VALUES ($1, $2)
            RETURNING id, name, created_by, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(category)
    }

    /// Finds a category by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, created_by, created_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Categories visible to a user across all their lists
    ///
    /// The union of categories the user created and categories attached to
    /// tasks in lists shared with the user, deduplicated by ID and ordered
    /// by name.
    pub async fn visible_to_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT DISTINCT c.id, c.name, c.created_by, c.created_at
            FROM categories c
            WHERE c.created_by = $1
               OR c.id IN (
                    SELECT t.category_id
                    FROM tasks t
                    JOIN task_list_shares s ON s.list_id = t.list_id
                    WHERE s.user_id = $1 AND t.category_id IS NOT NULL
               )
            ORDER BY c.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }

    /// Categories usable on one list's detail view
    ///
    /// The union of categories the user created and categories currently
    /// attached to tasks in the given list. This scopes filter options to
    /// the list at hand instead of pulling in unrelated lists' categories.
    pub async fn visible_in_list(
        pool: &PgPool,
        user_id: Uuid,
        list_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT DISTINCT c.id, c.name, c.created_by, c.created_at
            FROM categories c
            WHERE c.created_by = $1
               OR c.id IN (
                    SELECT t.category_id
                    FROM tasks t
                    WHERE t.list_id = $2 AND t.category_id IS NOT NULL
               )
            ORDER BY c.name ASC
            "#,
        )
        .bind(user_id)
        .bind(list_id)
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }

    /// Renames a category
    pub async fn update_name(
        pool: &PgPool,
        id: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $2
            WHERE id = $1
            RETURNING id, name, created_by, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Deletes a category
    ///
    /// Tasks referencing it keep existing with their category cleared.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
