/// Calendar feed builder for the home view
///
/// Projects a user's outstanding assigned work into display-ready calendar
/// events: every incomplete task with a deadline where the user is an
/// assignee, across all lists they own or have shared access to, ordered
/// soonest-due first. The feed is recomputed on every request — the source
/// set is bounded by one user's assigned, open, deadlined tasks, so there
/// is nothing worth caching.
///
/// Event timestamps are the raw naive deadlines at second precision; no
/// timezone conversion is performed anywhere in the pipeline.
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::calendar::build_feed;
/// use uuid::Uuid;
///
/// # async fn example(pool: sqlx::PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// for event in build_feed(&pool, user_id).await? {
///     println!("{} at {} ({})", event.title, event.start, event.color);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::task::TaskPriority;

/// Sentinel shown when a task has no category attached
const NO_CATEGORY: &str = "None";

/// One feed entry, shaped for a calendar widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// The underlying task
    pub task_id: Uuid,

    /// Composite display title: `"{task} ({list} - {assignees})"`
    pub title: String,

    /// Event start: the task deadline, naive, second precision
    pub start: NaiveDateTime,

    /// Display color derived from priority
    pub color: String,

    /// Detail fields for the event popover
    pub extended_props: EventProps,
}

/// Detail fields carried on every calendar event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventProps {
    /// Task title on its own
    pub title: String,

    /// Task description
    pub description: Option<String>,

    /// Task priority
    pub priority: TaskPriority,

    /// Comma-joined assignee usernames
    pub assigned_to: String,

    /// Completion flag (always false in the feed, kept for the popover)
    pub completed: bool,

    /// Parent list title
    pub task_list: String,

    /// Category name, or `"None"` when no category is attached
    pub category: String,
}

/// One row of the feed query, before projection into an event
#[derive(Debug, sqlx::FromRow)]
struct FeedRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    deadline: NaiveDateTime,
    priority: TaskPriority,
    completed: bool,
    list_title: String,
    category_name: Option<String>,
    assignee_names: Vec<String>,
}

/// Display color for a priority
///
/// The mapping is total over the enum, so no fallback arm exists.
pub fn color_for(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::High => "red",
        TaskPriority::Medium => "orange",
        TaskPriority::Low => "green",
    }
}

/// Builds the composite event title
fn compose_title(task_title: &str, list_title: &str, assignees: &str) -> String {
    format!("{} ({} - {})", task_title, list_title, assignees)
}

impl CalendarEvent {
    fn from_row(row: FeedRow) -> Self {
        let assigned_to = row.assignee_names.join(", ");

        Self {
            task_id: row.id,
            title: compose_title(&row.title, &row.list_title, &assigned_to),
            start: row.deadline,
            color: color_for(row.priority).to_string(),
            extended_props: EventProps {
                title: row.title,
                description: row.description,
                priority: row.priority,
                assigned_to,
                completed: row.completed,
                task_list: row.list_title,
                category: row.category_name.unwrap_or_else(|| NO_CATEGORY.to_string()),
            },
        }
    }
}

/// Builds the calendar feed for one user
///
/// Source set: tasks where the user is an assignee, `completed` is false,
/// and a deadline is set, limited to lists the user owns or has shared
/// access to. Ordered by deadline ascending. Assignee names are joined in
/// username order so the composite titles are deterministic.
pub async fn build_feed(pool: &PgPool, user_id: Uuid) -> Result<Vec<CalendarEvent>, sqlx::Error> {
    let rows = sqlx::query_as::<_, FeedRow>(
        r#"
        SELECT t.id, t.title, t.description, t.deadline, t.priority, t.completed,
               l.title AS list_title,
               c.name AS category_name,
               ARRAY(SELECT u.username
                     FROM task_assignees a
                     JOIN users u ON u.id = a.user_id
                     WHERE a.task_id = t.id
                     ORDER BY u.username) AS assignee_names
        FROM tasks t
        JOIN task_lists l ON l.id = t.list_id
        LEFT JOIN categories c ON c.id = t.category_id
        WHERE t.completed = FALSE
          AND t.deadline IS NOT NULL
          AND EXISTS (SELECT 1 FROM task_assignees a
                      WHERE a.task_id = t.id AND a.user_id = $1)
          AND (l.owner_id = $1
               OR EXISTS (SELECT 1 FROM task_list_shares s
                          WHERE s.list_id = l.id AND s.user_id = $1))
        ORDER BY t.deadline ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(CalendarEvent::from_row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_row(priority: TaskPriority, category: Option<&str>) -> FeedRow {
        FeedRow {
            id: Uuid::new_v4(),
            title: "Milk".to_string(),
            description: Some("Two liters".to_string()),
            deadline: NaiveDate::from_ymd_opt(2024, 6, 15)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            priority,
            completed: false,
            list_title: "Groceries".to_string(),
            category_name: category.map(str::to_string),
            assignee_names: vec!["alice".to_string(), "bob".to_string()],
        }
    }

    #[test]
    fn test_color_mapping() {
        assert_eq!(color_for(TaskPriority::High), "red");
        assert_eq!(color_for(TaskPriority::Medium), "orange");
        assert_eq!(color_for(TaskPriority::Low), "green");
    }

    #[test]
    fn test_composite_title() {
        let event = CalendarEvent::from_row(sample_row(TaskPriority::Medium, None));
        assert_eq!(event.title, "Milk (Groceries - alice, bob)");
    }

    #[test]
    fn test_event_projection() {
        let event = CalendarEvent::from_row(sample_row(TaskPriority::High, Some("Food")));

        assert_eq!(event.color, "red");
        assert_eq!(event.start.format("%H:%M:%S").to_string(), "09:30:00");
        assert_eq!(event.extended_props.category, "Food");
        assert_eq!(event.extended_props.assigned_to, "alice, bob");
        assert_eq!(event.extended_props.task_list, "Groceries");
        assert!(!event.extended_props.completed);
    }

    #[test]
    fn test_missing_category_uses_sentinel() {
        let event = CalendarEvent::from_row(sample_row(TaskPriority::Low, None));
        assert_eq!(event.extended_props.category, "None");
    }
}
