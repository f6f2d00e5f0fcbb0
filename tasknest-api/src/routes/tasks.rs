/// Task endpoints
///
/// Task access always goes through the parent list's access check, and
/// create/update payloads are validated against the list's assignable-user
/// set (owner plus shared users) and the list-scoped visible categories
/// before anything is written.
///
/// # Endpoints
///
/// - `GET    /v1/lists/:id/tasks` - Filtered, ordered tasks
/// - `POST   /v1/lists/:id/tasks` - Create task
/// - `PUT    /v1/lists/:id/tasks/:task_id` - Update task (whole record)
/// - `DELETE /v1/lists/:id/tasks/:task_id` - Delete task
/// - `POST   /v1/lists/:id/tasks/:task_id/toggle` - Flip completed

use crate::{
    app::AppState,
    error::{validation_failed, ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tasknest_shared::{
    auth::{
        access::{require_list_access, require_task_access},
        middleware::AuthContext,
    },
    models::{
        category::Category,
        task::{CreateTask, Task, TaskPriority, UpdateTask},
        task_list::TaskList,
    },
    query::{CompletedFilter, SortKey, TaskFilters},
};
use uuid::Uuid;
use validator::Validate;

/// Query parameters for task filtering
///
/// All parameters are optional; `completed` defaults to `False` (open
/// tasks only) and `sort` to `deadline`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskFilterParams {
    /// Keep tasks assigned to this user
    pub assigned_to: Option<Uuid>,

    /// Keep tasks due on this calendar date (`YYYY-MM-DD`)
    pub due_on: Option<NaiveDate>,

    /// Completion filter: `False` (default), `True`, or `All`
    pub completed: Option<CompletedFilter>,

    /// Exact priority match: `High`, `Medium`, or `Low`
    pub priority: Option<TaskPriority>,

    /// Exact category match
    pub category_id: Option<Uuid>,

    /// Sort key, optionally `-`-prefixed for descending
    pub sort: Option<String>,
}

impl TaskFilterParams {
    /// Validates the parameters into a filter set
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` when the sort key is off the allow-list.
    pub fn into_filters(self) -> Result<TaskFilters, ApiError> {
        let sort = match self.sort.as_deref() {
            Some(input) => Some(
                SortKey::parse(input)
                    .ok_or_else(|| ApiError::BadRequest(format!("Unknown sort key: {}", input)))?,
            ),
            None => None,
        };

        Ok(TaskFilters {
            assigned_to: self.assigned_to,
            due_on: self.due_on,
            completed: self.completed.unwrap_or_default(),
            priority: self.priority,
            category_id: self.category_id,
            sort,
        })
    }
}

/// Task create/update payload
#[derive(Debug, Deserialize, Validate)]
pub struct TaskPayload {
    /// Task title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional deadline (naive, `YYYY-MM-DDTHH:MM:SS`)
    pub deadline: Option<NaiveDateTime>,

    /// Priority level
    pub priority: TaskPriority,

    /// Optional category; must be visible on this list
    pub category_id: Option<Uuid>,

    /// Assigned users; all must have access to the list
    #[validate(length(min = 1, message = "At least one assignee is required"))]
    pub assigned_to: Vec<Uuid>,
}

/// Task response with its assignee set
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// Task ID
    pub id: Uuid,

    /// Owning list ID
    pub list_id: Uuid,

    /// Task title
    pub title: String,

    /// Description
    pub description: Option<String>,

    /// Deadline
    pub deadline: Option<NaiveDateTime>,

    /// Priority
    pub priority: TaskPriority,

    /// Completion flag
    pub completed: bool,

    /// Category
    pub category_id: Option<Uuid>,

    /// Assigned user IDs
    pub assigned_to: Vec<Uuid>,
}

impl TaskResponse {
    /// Combines a task with its assignee IDs
    pub fn new(task: Task, assigned_to: Vec<Uuid>) -> Self {
        Self {
            id: task.id,
            list_id: task.list_id,
            title: task.title,
            description: task.description,
            deadline: task.deadline,
            priority: task.priority,
            completed: task.completed,
            category_id: task.category_id,
            assigned_to,
        }
    }
}

/// Loads tasks for a list and attaches assignees in one batch query
pub(crate) async fn load_task_responses(
    state: &AppState,
    list_id: Uuid,
    filters: &TaskFilters,
) -> ApiResult<Vec<TaskResponse>> {
    let tasks = Task::list_filtered(&state.db, list_id, filters).await?;

    let task_ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
    let mut assignees = Task::assignees_for_tasks(&state.db, &task_ids).await?;

    Ok(tasks
        .into_iter()
        .map(|task| {
            let assigned_to = assignees.remove(&task.id).unwrap_or_default();
            TaskResponse::new(task, assigned_to)
        })
        .collect())
}

/// Validates the payload's cross-record references
///
/// Assignees must come from {owner} ∪ {shared users}; the category, when
/// supplied, must be in the list-scoped visible set.
async fn validate_task_refs(
    state: &AppState,
    auth: &AuthContext,
    list: &TaskList,
    payload: &TaskPayload,
) -> ApiResult<()> {
    let mut allowed = TaskList::shared_user_ids(&state.db, list.id).await?;
    allowed.push(list.owner_id);

    if payload.assigned_to.iter().any(|id| !allowed.contains(id)) {
        return Err(ApiError::invalid_field(
            "assigned_to",
            "Assignees must have access to this task list",
        ));
    }

    if let Some(category_id) = payload.category_id {
        let visible = Category::visible_in_list(&state.db, auth.user_id, list.id).await?;
        if !visible.iter().any(|c| c.id == category_id) {
            return Err(ApiError::invalid_field(
                "category_id",
                "Category is not visible on this task list",
            ));
        }
    }

    Ok(())
}

/// Lists a task list's tasks, filtered and ordered
///
/// # Endpoint
///
/// ```text
/// GET /v1/lists/:id/tasks?completed=All&priority=High&sort=-deadline
/// ```
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
    Query(params): Query<TaskFilterParams>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    require_list_access(&state.db, auth.user_id, list_id).await?;

    let filters = params.into_filters()?;
    let tasks = load_task_responses(&state, list_id, &filters).await?;

    Ok(Json(tasks))
}

/// Creates a task in a list
///
/// Any user with list access may create tasks; the payload's assignees and
/// category are validated first, and nothing is written on failure.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
    Json(payload): Json<TaskPayload>,
) -> ApiResult<Json<TaskResponse>> {
    let list = require_list_access(&state.db, auth.user_id, list_id).await?;

    payload.validate().map_err(validation_failed)?;
    validate_task_refs(&state, &auth, &list, &payload).await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            list_id: list.id,
            title: payload.title,
            description: payload.description,
            deadline: payload.deadline,
            priority: payload.priority,
            category_id: payload.category_id,
            assigned_to: payload.assigned_to.clone(),
        },
    )
    .await?;

    Ok(Json(TaskResponse::new(task, payload.assigned_to)))
}

/// Updates a task (whole record, all-or-nothing)
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((list_id, task_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<TaskPayload>,
) -> ApiResult<Json<TaskResponse>> {
    let (list, task) = require_task_access(&state.db, auth.user_id, list_id, task_id).await?;

    payload.validate().map_err(validation_failed)?;
    validate_task_refs(&state, &auth, &list, &payload).await?;

    let updated = Task::update(
        &state.db,
        task.id,
        UpdateTask {
            title: payload.title,
            description: payload.description,
            deadline: payload.deadline,
            priority: payload.priority,
            category_id: payload.category_id,
            assigned_to: payload.assigned_to.clone(),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse::new(updated, payload.assigned_to)))
}

/// Deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((list_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    let (_, task) = require_task_access(&state.db, auth.user_id, list_id, task_id).await?;

    Task::delete(&state.db, task.id).await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Flips a task's completed flag
pub async fn toggle_task_completed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((list_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<TaskResponse>> {
    let (_, task) = require_task_access(&state.db, auth.user_id, list_id, task_id).await?;

    let toggled = Task::toggle_completed(&state.db, task.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let assigned_to = Task::assignee_ids(&state.db, toggled.id).await?;

    Ok(Json(TaskResponse::new(toggled, assigned_to)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_params_default_to_open_tasks() {
        let filters = TaskFilterParams::default().into_filters().unwrap();
        assert_eq!(filters.completed, CompletedFilter::Incomplete);
        assert!(filters.sort.is_none());
    }

    #[test]
    fn test_filter_params_reject_unknown_sort() {
        let params = TaskFilterParams {
            sort: Some("password_hash".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            params.into_filters(),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_filter_params_accept_descending_sort() {
        let params = TaskFilterParams {
            sort: Some("-priority".to_string()),
            ..Default::default()
        };

        let filters = params.into_filters().unwrap();
        assert_eq!(filters.order_by_sql(), "t.priority DESC");
    }

    #[test]
    fn test_payload_requires_assignees() {
        let payload = TaskPayload {
            title: "Milk".to_string(),
            description: None,
            deadline: None,
            priority: TaskPriority::Medium,
            category_id: None,
            assigned_to: vec![],
        };

        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_payload_requires_title() {
        let payload = TaskPayload {
            title: String::new(),
            description: None,
            deadline: None,
            priority: TaskPriority::Low,
            category_id: None,
            assigned_to: vec![Uuid::new_v4()],
        };

        assert!(payload.validate().is_err());
    }
}
