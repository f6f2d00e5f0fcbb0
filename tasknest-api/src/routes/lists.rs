/// Task list endpoints
///
/// Reads are open to owner and shared users alike; rename, delete, and
/// share are owner-only. The detail view bundles the list, its filtered
/// tasks, and the list-scoped category options in one response so a
/// client can render filter controls without extra round-trips.
///
/// # Endpoints
///
/// - `GET    /v1/lists` - Accessible lists with task counts
/// - `POST   /v1/lists` - Create list
/// - `GET    /v1/lists/:id` - Detail: list + filtered tasks + categories
/// - `PUT    /v1/lists/:id` - Rename (owner only)
/// - `DELETE /v1/lists/:id` - Delete (owner only, cascades tasks)
/// - `POST   /v1/lists/:id/share` - Share by email (owner only)

use crate::{
    app::AppState,
    error::{validation_failed, ApiError, ApiResult},
    routes::tasks::{load_task_responses, TaskFilterParams, TaskResponse},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasknest_shared::{
    auth::{
        access::{require_list_access, require_list_ownership},
        middleware::AuthContext,
    },
    models::{
        category::Category,
        task_list::{CreateTaskList, TaskList},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create/rename request
#[derive(Debug, Deserialize, Validate)]
pub struct TaskListPayload {
    /// List title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
}

/// Share request
#[derive(Debug, Deserialize, Validate)]
pub struct ShareRequest {
    /// Email of the user to share with
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Share response
#[derive(Debug, Serialize)]
pub struct ShareResponse {
    /// List that was shared
    pub list_id: Uuid,

    /// Recipient email
    pub email: String,
}

/// One list in the overview, with its task counts
#[derive(Debug, Serialize)]
pub struct TaskListSummaryResponse {
    /// List ID
    pub id: Uuid,

    /// List title
    pub title: String,

    /// Owning user
    pub owner_id: Uuid,

    /// When the list was created
    pub created_at: DateTime<Utc>,

    /// Total tasks
    pub task_count: i64,

    /// Completed tasks
    pub completed_count: i64,

    /// Open tasks
    pub incomplete_count: i64,
}

/// List detail response
#[derive(Debug, Serialize)]
pub struct TaskListDetailResponse {
    /// The list itself
    pub list: TaskList,

    /// Tasks after filtering and ordering
    pub tasks: Vec<TaskResponse>,

    /// Categories offered as filter options for this list
    pub categories: Vec<Category>,
}

/// Lists every task list the user can access
///
/// # Endpoint
///
/// ```text
/// GET /v1/lists
/// ```
pub async fn list_task_lists(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskListSummaryResponse>>> {
    let lists = TaskList::list_for_user(&state.db, auth.user_id).await?;

    let response = lists
        .into_iter()
        .map(|summary| TaskListSummaryResponse {
            incomplete_count: summary.incomplete_count(),
            id: summary.id,
            title: summary.title,
            owner_id: summary.owner_id,
            created_at: summary.created_at,
            task_count: summary.task_count,
            completed_count: summary.completed_count,
        })
        .collect();

    Ok(Json(response))
}

/// Creates a task list owned by the acting user
pub async fn create_task_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<TaskListPayload>,
) -> ApiResult<Json<TaskList>> {
    payload.validate().map_err(validation_failed)?;

    let list = TaskList::create(
        &state.db,
        CreateTaskList {
            title: payload.title,
            owner_id: auth.user_id,
        },
    )
    .await?;

    Ok(Json(list))
}

/// List detail: the list, its filtered tasks, and filter options
///
/// # Endpoint
///
/// ```text
/// GET /v1/lists/:id?completed=All&sort=-deadline
/// ```
pub async fn get_task_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
    Query(params): Query<TaskFilterParams>,
) -> ApiResult<Json<TaskListDetailResponse>> {
    let list = require_list_access(&state.db, auth.user_id, list_id).await?;

    let filters = params.into_filters()?;
    let tasks = load_task_responses(&state, list.id, &filters).await?;
    let categories = Category::visible_in_list(&state.db, auth.user_id, list.id).await?;

    Ok(Json(TaskListDetailResponse {
        list,
        tasks,
        categories,
    }))
}

/// Renames a task list (owner only)
pub async fn update_task_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
    Json(payload): Json<TaskListPayload>,
) -> ApiResult<Json<TaskList>> {
    require_list_ownership(&state.db, auth.user_id, list_id).await?;

    payload.validate().map_err(validation_failed)?;

    let list = TaskList::update_title(&state.db, list_id, &payload.title)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task list not found".to_string()))?;

    Ok(Json(list))
}

/// Deletes a task list and all its tasks (owner only)
pub async fn delete_task_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    require_list_ownership(&state.db, auth.user_id, list_id).await?;

    TaskList::delete(&state.db, list_id).await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Shares a task list with another user by email (owner only)
///
/// An unknown email answers 422 with a field-level message and leaves the
/// list untouched; sharing twice with the same user is a no-op.
pub async fn share_task_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
    Json(payload): Json<ShareRequest>,
) -> ApiResult<Json<ShareResponse>> {
    let list = require_list_ownership(&state.db, auth.user_id, list_id).await?;

    payload.validate().map_err(validation_failed)?;

    list.share_with_email(&state.db, &payload.email).await?;

    Ok(Json(ShareResponse {
        list_id: list.id,
        email: payload.email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_validation() {
        let payload = TaskListPayload {
            title: String::new(),
        };
        assert!(payload.validate().is_err());

        let payload = TaskListPayload {
            title: "Groceries".to_string(),
        };
        assert!(payload.validate().is_ok());

        let payload = TaskListPayload {
            title: "x".repeat(201),
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_share_request_email_validation() {
        let payload = ShareRequest {
            email: "not-an-email".to_string(),
        };
        assert!(payload.validate().is_err());

        let payload = ShareRequest {
            email: "friend@example.com".to_string(),
        };
        assert!(payload.validate().is_ok());
    }
}
