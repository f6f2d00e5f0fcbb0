/// Task filter pipeline
///
/// A task-list view narrows its tasks through up to five optional,
/// independently supplied filters and orders the result by a validated
/// sort key. Filters compose conjunctively: a task must satisfy every
/// supplied filter.
///
/// The SQL is assembled from an ordered rule table rather than a hard-coded
/// conditional cascade: [`TaskFilters::where_clauses`] walks the parameters
/// in a fixed order and emits one numbered predicate per supplied value,
/// and the caller binds values in the same order. That keeps the rule table
/// testable without a database; `Task::list_filtered` is the only executor.
///
/// # Example
///
/// ```
/// use tasknest_shared::models::task::TaskPriority;
/// use tasknest_shared::query::{CompletedFilter, TaskFilters};
///
/// let filters = TaskFilters {
///     priority: Some(TaskPriority::High),
///     ..Default::default()
/// };
///
/// // The default completed filter hides finished tasks.
/// assert_eq!(filters.completed, CompletedFilter::Incomplete);
/// assert_eq!(
///     filters.where_clauses(2),
///     vec!["t.completed = FALSE".to_string(), "t.priority = $2".to_string()],
/// );
/// ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::task::TaskPriority;

/// Completion-state filter
///
/// The wire values mirror the query-string contract: `False`, `True`,
/// `All`. An absent parameter means `Incomplete` — list views favor
/// actionable tasks, and `All` is the explicit way to widen them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletedFilter {
    /// Only open tasks (the default)
    #[default]
    #[serde(rename = "False")]
    Incomplete,

    /// Only finished tasks
    #[serde(rename = "True")]
    Complete,

    /// No completion predicate at all
    #[serde(rename = "All")]
    All,
}

/// Sortable task fields
///
/// A closed allow-list: sort parameters never reach SQL unvalidated, so
/// internal column names are not an input surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Task deadline (the default sort)
    Deadline,

    /// Priority, in declaration order High → Low
    Priority,

    /// Task title
    Title,

    /// Creation time
    CreatedAt,

    /// Completion flag
    Completed,
}

impl SortField {
    fn column(&self) -> &'static str {
        match self {
            SortField::Deadline => "t.deadline",
            SortField::Priority => "t.priority",
            SortField::Title => "t.title",
            SortField::CreatedAt => "t.created_at",
            SortField::Completed => "t.completed",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending
    Asc,

    /// Descending
    Desc,
}

/// Validated sort key: a field plus a direction
///
/// Parsed from strings like `deadline` or `-priority` (a `-` prefix flips
/// the direction to descending). Tasks without a deadline follow
/// PostgreSQL's default null placement: last under `ASC`, first under
/// `DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    /// Field to order by
    pub field: SortField,

    /// Direction to order in
    pub direction: SortDirection,
}

impl Default for SortKey {
    /// Deadline ascending: soonest-due first
    fn default() -> Self {
        Self {
            field: SortField::Deadline,
            direction: SortDirection::Asc,
        }
    }
}

impl SortKey {
    /// Parses a sort parameter, returning `None` for fields off the
    /// allow-list
    pub fn parse(input: &str) -> Option<Self> {
        let (name, direction) = match input.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (input, SortDirection::Asc),
        };

        let field = match name {
            "deadline" => SortField::Deadline,
            "priority" => SortField::Priority,
            "title" => SortField::Title,
            "created_at" => SortField::CreatedAt,
            "completed" => SortField::Completed,
            _ => return None,
        };

        Some(Self { field, direction })
    }

    /// Renders the `ORDER BY` expression
    pub fn to_sql(&self) -> String {
        let direction = match self.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        format!("{} {}", self.field.column(), direction)
    }
}

/// The full filter set for one task-list query
///
/// Every field is optional; absent fields contribute no predicate. The
/// one exception is `completed`, whose absence means "open tasks only".
#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    /// Keep tasks assigned to this user
    pub assigned_to: Option<Uuid>,

    /// Keep tasks whose deadline falls on this calendar date
    /// (time-of-day ignored)
    pub due_on: Option<NaiveDate>,

    /// Completion-state filter
    pub completed: CompletedFilter,

    /// Keep tasks with exactly this priority
    pub priority: Option<TaskPriority>,

    /// Keep tasks with exactly this category
    pub category_id: Option<Uuid>,

    /// Ordering key; `None` means deadline ascending
    pub sort: Option<SortKey>,
}

impl TaskFilters {
    /// Emits the `WHERE` predicates for the supplied filters
    ///
    /// The rule table runs in a fixed order — assignee, date, completion,
    /// priority, category — and numbers bind placeholders from
    /// `first_bind`. The completion rule is a constant comparison and
    /// consumes no placeholder. Callers must bind values in the same
    /// order (see `Task::list_filtered`).
    pub fn where_clauses(&self, first_bind: usize) -> Vec<String> {
        let mut clauses = Vec::new();
        let mut next_bind = first_bind;

        if self.assigned_to.is_some() {
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM task_assignees a \
                 WHERE a.task_id = t.id AND a.user_id = ${next_bind})"
            ));
            next_bind += 1;
        }

        if self.due_on.is_some() {
            clauses.push(format!("t.deadline::date = ${next_bind}"));
            next_bind += 1;
        }

        match self.completed {
            CompletedFilter::Incomplete => clauses.push("t.completed = FALSE".to_string()),
            CompletedFilter::Complete => clauses.push("t.completed = TRUE".to_string()),
            CompletedFilter::All => {}
        }

        if self.priority.is_some() {
            clauses.push(format!("t.priority = ${next_bind}"));
            next_bind += 1;
        }

        if self.category_id.is_some() {
            clauses.push(format!("t.category_id = ${next_bind}"));
        }

        clauses
    }

    /// Renders the `ORDER BY` expression for the selected sort key
    pub fn order_by_sql(&self) -> String {
        self.sort.unwrap_or_default().to_sql()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_hide_completed() {
        let filters = TaskFilters::default();

        assert_eq!(filters.completed, CompletedFilter::Incomplete);
        assert_eq!(
            filters.where_clauses(2),
            vec!["t.completed = FALSE".to_string()]
        );
    }

    #[test]
    fn test_all_disables_completion_predicate() {
        let filters = TaskFilters {
            completed: CompletedFilter::All,
            ..Default::default()
        };

        assert!(filters.where_clauses(2).is_empty());
    }

    #[test]
    fn test_complete_filter_predicate() {
        let filters = TaskFilters {
            completed: CompletedFilter::Complete,
            ..Default::default()
        };

        assert_eq!(
            filters.where_clauses(2),
            vec!["t.completed = TRUE".to_string()]
        );
    }

    #[test]
    fn test_each_rule_contributes_one_clause() {
        let filters = TaskFilters {
            assigned_to: Some(Uuid::new_v4()),
            due_on: Some(NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()),
            completed: CompletedFilter::Incomplete,
            priority: Some(TaskPriority::High),
            category_id: Some(Uuid::new_v4()),
            sort: None,
        };

        let clauses = filters.where_clauses(2);
        assert_eq!(
            clauses,
            vec![
                "EXISTS (SELECT 1 FROM task_assignees a \
                 WHERE a.task_id = t.id AND a.user_id = $2)"
                    .to_string(),
                "t.deadline::date = $3".to_string(),
                "t.completed = FALSE".to_string(),
                "t.priority = $4".to_string(),
                "t.category_id = $5".to_string(),
            ]
        );
    }

    #[test]
    fn test_bind_numbering_skips_absent_rules() {
        // The completion rule binds nothing, and absent rules leave no gap.
        let filters = TaskFilters {
            priority: Some(TaskPriority::Low),
            category_id: Some(Uuid::new_v4()),
            ..Default::default()
        };

        let clauses = filters.where_clauses(2);
        assert_eq!(
            clauses,
            vec![
                "t.completed = FALSE".to_string(),
                "t.priority = $2".to_string(),
                "t.category_id = $3".to_string(),
            ]
        );
    }

    #[test]
    fn test_sort_key_parse_allow_list() {
        let key = SortKey::parse("deadline").unwrap();
        assert_eq!(key.field, SortField::Deadline);
        assert_eq!(key.direction, SortDirection::Asc);

        let key = SortKey::parse("-priority").unwrap();
        assert_eq!(key.field, SortField::Priority);
        assert_eq!(key.direction, SortDirection::Desc);

        assert!(SortKey::parse("title").is_some());
        assert!(SortKey::parse("created_at").is_some());
        assert!(SortKey::parse("completed").is_some());

        // Anything off the allow-list is rejected, not passed through.
        assert!(SortKey::parse("id").is_none());
        assert!(SortKey::parse("owner_id").is_none());
        assert!(SortKey::parse("deadline; DROP TABLE tasks").is_none());
        assert!(SortKey::parse("").is_none());
    }

    #[test]
    fn test_default_sort_is_deadline_ascending() {
        let filters = TaskFilters::default();
        assert_eq!(filters.order_by_sql(), "t.deadline ASC");
    }

    #[test]
    fn test_sort_key_to_sql() {
        let key = SortKey::parse("-created_at").unwrap();
        assert_eq!(key.to_sql(), "t.created_at DESC");

        // Null deadlines sort last ascending, first descending (PostgreSQL
        // default placement); the rendered SQL relies on it.
        let key = SortKey::parse("deadline").unwrap();
        assert_eq!(key.to_sql(), "t.deadline ASC");
    }

    #[test]
    fn test_completed_filter_wire_values() {
        let parsed: CompletedFilter = serde_json::from_str("\"All\"").unwrap();
        assert_eq!(parsed, CompletedFilter::All);
        let parsed: CompletedFilter = serde_json::from_str("\"True\"").unwrap();
        assert_eq!(parsed, CompletedFilter::Complete);
        let parsed: CompletedFilter = serde_json::from_str("\"False\"").unwrap();
        assert_eq!(parsed, CompletedFilter::Incomplete);

        assert!(serde_json::from_str::<CompletedFilter>("\"false\"").is_err());
    }
}
