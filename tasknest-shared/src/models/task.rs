/// Task model and database operations
///
/// Tasks live inside a task list and carry a priority, an optional naive
/// deadline, an optional category, and a set of assigned users. Assignees
/// are stored in a join table and must be drawn from the users with access
/// to the parent list; that rule is enforced at the API boundary, not here.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('high', 'medium', 'low');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     list_id UUID NOT NULL REFERENCES task_lists(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     deadline TIMESTAMP,
///     priority task_priority NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     category_id UUID REFERENCES categories(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE task_assignees (
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     PRIMARY KEY (task_id, user_id)
/// );
/// ```
///
/// Deadlines are naive timestamps: they are stored and compared without
/// timezone conversion.
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::models::task::{CreateTask, Task, TaskPriority};
/// use uuid::Uuid;
///
/// # async fn example(pool: sqlx::PgPool, list_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     list_id,
///     title: "Milk".to_string(),
///     description: None,
///     deadline: None,
///     priority: TaskPriority::Medium,
///     category_id: None,
///     assigned_to: vec![user_id],
/// }).await?;
///
/// Task::toggle_completed(&pool, task.id).await?;
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::query::TaskFilters;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
pub enum TaskPriority {
    /// Needs attention first
    High,

    /// Default urgency
    Medium,

    /// Can wait
    Low,
}

impl TaskPriority {
    /// Display form, matching the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::High => "High",
            TaskPriority::Medium => "Medium",
            TaskPriority::Low => "Low",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(TaskPriority::High),
            "Medium" => Ok(TaskPriority::Medium),
            "Low" => Ok(TaskPriority::Low),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning task list; immutable after creation
    pub list_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Optional deadline (naive, no timezone)
    pub deadline: Option<NaiveDateTime>,

    /// Priority level
    pub priority: TaskPriority,

    /// Whether the task is done
    pub completed: bool,

    /// Optional category label
    pub category_id: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether the deadline has passed (false when no deadline is set)
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        match self.deadline {
            Some(deadline) => now > deadline,
            None => false,
        }
    }
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning task list
    pub list_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional deadline
    pub deadline: Option<NaiveDateTime>,

    /// Priority level
    pub priority: TaskPriority,

    /// Optional category
    pub category_id: Option<Uuid>,

    /// Assigned users; the API boundary validates these against the list's
    /// owner and share set
    pub assigned_to: Vec<Uuid>,
}

/// Input for updating a task
///
/// Updates are whole-record: every field is written, and the assignee set
/// is replaced. The write runs in a transaction so a failed update leaves
/// the task untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: String,

    /// New description
    pub description: Option<String>,

    /// New deadline
    pub deadline: Option<NaiveDateTime>,

    /// New priority
    pub priority: TaskPriority,

    /// New category
    pub category_id: Option<Uuid>,

    /// Replacement assignee set
    pub assigned_to: Vec<Uuid>,
}

const TASK_COLUMNS: &str = "id, list_id, title, description, deadline, priority, completed, \
                            category_id, created_at, updated_at";

impl Task {
    /// Creates a task and its assignee rows in one transaction
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (list_id, title, description, deadline, priority, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.list_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.deadline)
        .bind(data.priority)
        .bind(data.category_id)
        .fetch_one(&mut *tx)
        .await?;

        for user_id in &data.assigned_to {
            sqlx::query(
                r#"
                INSERT INTO task_assignees (task_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(task.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(task)
    }

    /// Finds a task by ID within a specific list
    ///
    /// The list scope keeps task lookups behind the list's access check.
    pub async fn find_by_id_in_list(
        pool: &PgPool,
        id: Uuid,
        list_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE id = $1 AND list_id = $2
            "#,
        ))
        .bind(id)
        .bind(list_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a task list's tasks, narrowed and ordered by the filter set
    ///
    /// The caller must have verified list access already. The query is
    /// rebuilt per request from the filter rule table; see
    /// [`TaskFilters`](crate::query::TaskFilters).
    pub async fn list_filtered(
        pool: &PgPool,
        list_id: Uuid,
        filters: &TaskFilters,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks t WHERE t.list_id = $1"
        );
        for clause in filters.where_clauses(2) {
            sql.push_str(" AND ");
            sql.push_str(&clause);
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(&filters.order_by_sql());

        // Binds follow the rule-table order used by where_clauses.
        let mut query = sqlx::query_as::<_, Task>(&sql).bind(list_id);
        if let Some(user_id) = filters.assigned_to {
            query = query.bind(user_id);
        }
        if let Some(date) = filters.due_on {
            query = query.bind(date);
        }
        if let Some(priority) = filters.priority {
            query = query.bind(priority);
        }
        if let Some(category_id) = filters.category_id {
            query = query.bind(category_id);
        }

        query.fetch_all(pool).await
    }

    /// Updates a task and replaces its assignee set in one transaction
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                deadline = $4,
                priority = $5,
                category_id = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.deadline)
        .bind(data.priority)
        .bind(data.category_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(task) = task else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM task_assignees WHERE task_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for user_id in &data.assigned_to {
            sqlx::query(
                r#"
                INSERT INTO task_assignees (task_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Some(task))
    }

    /// Flips the completed flag
    pub async fn toggle_completed(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET completed = NOT completed,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Returns the assignee IDs of one task
    pub async fn assignee_ids(pool: &PgPool, task_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT user_id FROM task_assignees WHERE task_id = $1",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Returns assignee IDs for a batch of tasks, keyed by task ID
    ///
    /// One query instead of one per task when rendering a list view.
    pub async fn assignees_for_tasks(
        pool: &PgPool,
        task_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Uuid>>, sqlx::Error> {
        let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT task_id, user_id FROM task_assignees WHERE task_id = ANY($1)",
        )
        .bind(task_ids)
        .fetch_all(pool)
        .await?;

        let mut map: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (task_id, user_id) in rows {
            map.entry(task_id).or_default().push(user_id);
        }

        Ok(map)
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task_with_deadline(deadline: Option<NaiveDateTime>) -> Task {
        Task {
            id: Uuid::new_v4(),
            list_id: Uuid::new_v4(),
            title: "Test Task".to_string(),
            description: None,
            deadline,
            priority: TaskPriority::Medium,
            completed: false,
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_priority_as_str() {
        assert_eq!(TaskPriority::High.as_str(), "High");
        assert_eq!(TaskPriority::Medium.as_str(), "Medium");
        assert_eq!(TaskPriority::Low.as_str(), "Low");
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("High".parse::<TaskPriority>().unwrap(), TaskPriority::High);
        assert_eq!("Low".parse::<TaskPriority>().unwrap(), TaskPriority::Low);
        assert!("urgent".parse::<TaskPriority>().is_err());
        // Wire values are capitalized; lowercase is rejected.
        assert!("high".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn test_priority_serde_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskPriority::Medium).unwrap(),
            "\"Medium\""
        );
        let parsed: TaskPriority = serde_json::from_str("\"High\"").unwrap();
        assert_eq!(parsed, TaskPriority::High);
    }

    #[test]
    fn test_is_overdue() {
        let noon = NaiveDate::from_ymd_opt(2024, 6, 12)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let past = task_with_deadline(Some(noon - chrono::Duration::hours(1)));
        let future = task_with_deadline(Some(noon + chrono::Duration::hours(1)));
        let none = task_with_deadline(None);

        assert!(past.is_overdue(noon));
        assert!(!future.is_overdue(noon));
        assert!(!none.is_overdue(noon));
    }
}
