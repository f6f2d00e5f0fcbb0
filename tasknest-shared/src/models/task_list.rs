/// TaskList model and database operations
///
/// A task list is owned by exactly one user and may be shared with others.
/// Ownership and sharing both grant full read/write access to the list and
/// its tasks; only the owner may rename, delete, or share the list.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_lists (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE task_list_shares (
///     list_id UUID NOT NULL REFERENCES task_lists(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (list_id, user_id)
/// );
/// ```
///
/// The owner never appears in `task_list_shares`; a share grant is an
/// idempotent set-add and there is no revocation.
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::models::task_list::{CreateTaskList, TaskList};
/// use uuid::Uuid;
///
/// # async fn example(pool: sqlx::PgPool, owner_id: Uuid, friend_id: Uuid) -> Result<(), sqlx::Error> {
/// let list = TaskList::create(&pool, CreateTaskList {
///     title: "Groceries".to_string(),
///     owner_id,
/// }).await?;
///
/// TaskList::add_share(&pool, list.id, friend_id).await?;
/// assert!(TaskList::user_has_access(&pool, list.id, friend_id).await?);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::User;

/// Error type for the sharing protocol
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    /// No user is registered under the given email
    #[error("No user found with this email address")]
    RecipientNotFound,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Task list model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskList {
    /// Unique list ID
    pub id: Uuid,

    /// List title
    pub title: String,

    /// Owning user; immutable after creation
    pub owner_id: Uuid,

    /// When the list was created
    pub created_at: DateTime<Utc>,
}

/// Task list annotated with task counts for the overview page
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskListSummary {
    /// Unique list ID
    pub id: Uuid,

    /// List title
    pub title: String,

    /// Owning user
    pub owner_id: Uuid,

    /// When the list was created
    pub created_at: DateTime<Utc>,

    /// Total number of tasks in the list
    pub task_count: i64,

    /// Number of completed tasks
    pub completed_count: i64,
}

impl TaskListSummary {
    /// Number of tasks still open
    pub fn incomplete_count(&self) -> i64 {
        self.task_count - self.completed_count
    }
}

/// Input for creating a new task list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskList {
    /// List title
    pub title: String,

    /// Owning user
    pub owner_id: Uuid,
}

impl TaskList {
    /// Access predicate: owner or share-set member.
    ///
    /// Pure counterpart of [`TaskList::user_has_access`], for callers that
    /// already loaded the share set.
    pub fn grants_access(&self, user_id: Uuid, shared_user_ids: &[Uuid]) -> bool {
        self.owner_id == user_id || shared_user_ids.contains(&user_id)
    }

    /// Creates a new task list
    pub async fn create(pool: &PgPool, data: CreateTaskList) -> Result<Self, sqlx::Error> {
        let list = sqlx::query_as::<_, TaskList>(
            r#"
            INSERT INTO task_lists (title, owner_id)
            VALUES ($1, $2)
            RETURNING id, title, owner_id, created_at
            "#,
        )
        .bind(data.title)
        .bind(data.owner_id)
        .fetch_one(pool)
        .await?;

        Ok(list)
    }

    /// Finds a task list by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let list = sqlx::query_as::<_, TaskList>(
            r#"
            SELECT id, title, owner_id, created_at
            FROM task_lists
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(list)
    }

    /// Checks whether a user may access a list (owner or shared with)
    pub async fn user_has_access(
        pool: &PgPool,
        list_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (has_access,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM task_lists l
                WHERE l.id = $1
                  AND (l.owner_id = $2
                       OR EXISTS (SELECT 1 FROM task_list_shares s
                                  WHERE s.list_id = l.id AND s.user_id = $2))
            )
            "#,
        )
        .bind(list_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(has_access)
    }

    /// Lists every list a user can access, annotated with task counts
    ///
    /// Returns owned lists and lists shared with the user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<TaskListSummary>, sqlx::Error> {
        let lists = sqlx::query_as::<_, TaskListSummary>(
            r#"
            SELECT l.id, l.title, l.owner_id, l.created_at,
                   COUNT(t.id) AS task_count,
                   COUNT(t.id) FILTER (WHERE t.completed) AS completed_count
            FROM task_lists l
            LEFT JOIN tasks t ON t.list_id = l.id
            WHERE l.owner_id = $1
               OR EXISTS (SELECT 1 FROM task_list_shares s
                          WHERE s.list_id = l.id AND s.user_id = $1)
            GROUP BY l.id, l.title, l.owner_id, l.created_at
            ORDER BY l.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(lists)
    }

    /// Returns the IDs of users the list is shared with (owner excluded)
    pub async fn shared_user_ids(pool: &PgPool, list_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT user_id FROM task_list_shares
            WHERE list_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(list_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Grants a user access to the list
    ///
    /// Idempotent set-add: sharing with an already-present user is a no-op.
    /// Returns true if a new grant was inserted.
    pub async fn add_share(
        pool: &PgPool,
        list_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO task_list_shares (list_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(list_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Shares the list with the user registered under `email`
    ///
    /// The caller must already have verified that the acting user owns the
    /// list. An unknown email fails with [`ShareError::RecipientNotFound`]
    /// and leaves the list unmodified. Sharing with the owner or with an
    /// already-present user is a no-op, so the operation is idempotent.
    pub async fn share_with_email(&self, pool: &PgPool, email: &str) -> Result<(), ShareError> {
        let target = User::find_by_email(pool, email)
            .await?
            .ok_or(ShareError::RecipientNotFound)?;

        // The owner never enters the share table.
        if target.id == self.owner_id {
            return Ok(());
        }

        TaskList::add_share(pool, self.id, target.id).await?;
        Ok(())
    }

    /// Renames a task list
    pub async fn update_title(
        pool: &PgPool,
        id: Uuid,
        title: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let list = sqlx::query_as::<_, TaskList>(
            r#"
            UPDATE task_lists
            SET title = $2
            WHERE id = $1
            RETURNING id, title, owner_id, created_at
            "#,
        )
        .bind(id)
        .bind(title)
        .fetch_optional(pool)
        .await?;

        Ok(list)
    }

    /// Deletes a task list
    ///
    /// Cascades to the list's tasks and share grants.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_lists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_owned_by(owner_id: Uuid) -> TaskList {
        TaskList {
            id: Uuid::new_v4(),
            title: "Test List".to_string(),
            owner_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_grants_access_to_owner() {
        let owner = Uuid::new_v4();
        let list = list_owned_by(owner);

        assert!(list.grants_access(owner, &[]));
    }

    #[test]
    fn test_grants_access_to_shared_user() {
        let owner = Uuid::new_v4();
        let friend = Uuid::new_v4();
        let list = list_owned_by(owner);

        assert!(list.grants_access(friend, &[friend]));
    }

    #[test]
    fn test_denies_access_to_stranger() {
        let owner = Uuid::new_v4();
        let friend = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let list = list_owned_by(owner);

        assert!(!list.grants_access(stranger, &[friend]));
    }

    #[test]
    fn test_summary_incomplete_count() {
        let summary = TaskListSummary {
            id: Uuid::new_v4(),
            title: "Chores".to_string(),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            task_count: 5,
            completed_count: 2,
        };

        assert_eq!(summary.incomplete_count(), 3);
    }
}
