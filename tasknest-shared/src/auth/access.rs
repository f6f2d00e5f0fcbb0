/// Access policy for task lists, tasks, and categories
///
/// The grant model is deliberately flat: a user may read and write a task
/// list iff they own it or it is shared with them, and task access
/// delegates to the parent list. There is no read-only tier; callers that
/// ever need differentiated permissions must widen the predicate's result
/// into a capability set.
///
/// Every retrieval and mutation goes through a `require_*` helper before
/// acting, so the two failure shapes stay distinct: [`AccessError::NotFound`]
/// when the ID does not exist at all, [`AccessError::Denied`] when it exists
/// but the policy refuses — denial never reveals anything beyond itself.
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::auth::access::require_list_access;
/// use uuid::Uuid;
///
/// # async fn example(pool: sqlx::PgPool, user_id: Uuid, list_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let list = require_list_access(&pool, user_id, list_id).await?;
/// println!("may read and write {}", list.title);
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::category::Category;
use crate::models::task::Task;
use crate::models::task_list::TaskList;

/// Error type for access checks
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// No resource with that ID
    #[error("Resource not found")]
    NotFound,

    /// The resource exists but the user may not touch it
    #[error("Not authorized to access this resource")]
    Denied,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Loads a task list the user may read and write
///
/// # Errors
///
/// - [`AccessError::NotFound`] if no list has this ID
/// - [`AccessError::Denied`] if the user is neither owner nor shared with
pub async fn require_list_access(
    pool: &PgPool,
    user_id: Uuid,
    list_id: Uuid,
) -> Result<TaskList, AccessError> {
    let list = TaskList::find_by_id(pool, list_id)
        .await?
        .ok_or(AccessError::NotFound)?;

    if !TaskList::user_has_access(pool, list_id, user_id).await? {
        return Err(AccessError::Denied);
    }

    Ok(list)
}

/// Loads a task list the user owns
///
/// Rename, delete, and share are owner-only; shared access does not grant
/// re-sharing rights.
pub async fn require_list_ownership(
    pool: &PgPool,
    user_id: Uuid,
    list_id: Uuid,
) -> Result<TaskList, AccessError> {
    let list = TaskList::find_by_id(pool, list_id)
        .await?
        .ok_or(AccessError::NotFound)?;

    if list.owner_id != user_id {
        return Err(AccessError::Denied);
    }

    Ok(list)
}

/// Loads a task the user may read and write, via its parent list
///
/// Task access is exactly parent-list access; the task must also belong
/// to the named list, so task IDs cannot be probed across lists.
pub async fn require_task_access(
    pool: &PgPool,
    user_id: Uuid,
    list_id: Uuid,
    task_id: Uuid,
) -> Result<(TaskList, Task), AccessError> {
    let list = require_list_access(pool, user_id, list_id).await?;

    let task = Task::find_by_id_in_list(pool, task_id, list_id)
        .await?
        .ok_or(AccessError::NotFound)?;

    Ok((list, task))
}

/// Checks that the user created a category
///
/// Category writes are creator-only; reads are wider (any category on a
/// task the user can see).
pub fn require_category_ownership(category: &Category, user_id: Uuid) -> Result<(), AccessError> {
    if category.created_by != user_id {
        return Err(AccessError::Denied);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_category_ownership_check() {
        let creator = Uuid::new_v4();
        let category = Category {
            id: Uuid::new_v4(),
            name: "Errands".to_string(),
            created_by: creator,
            created_at: Utc::now(),
        };

        assert!(require_category_ownership(&category, creator).is_ok());
        assert!(matches!(
            require_category_ownership(&category, Uuid::new_v4()),
            Err(AccessError::Denied)
        ));
    }

    #[test]
    fn test_access_error_display() {
        assert_eq!(AccessError::NotFound.to_string(), "Resource not found");
        assert_eq!(
            AccessError::Denied.to_string(),
            "Not authorized to access this resource"
        );
    }
}
