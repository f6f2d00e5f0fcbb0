/// Home-view calendar feed endpoint
///
/// Returns the acting user's outstanding assigned work as calendar events:
/// incomplete, deadlined tasks where they are an assignee, across owned
/// and shared lists, soonest-due first. Rebuilt on every request.
///
/// # Endpoint
///
/// ```text
/// GET /v1/feed
/// ```
///
/// # Response
///
/// ```json
/// [
///   {
///     "task_id": "uuid",
///     "title": "Milk (Groceries - alice, bob)",
///     "start": "2024-06-15T09:30:00",
///     "color": "orange",
///     "extended_props": {
///       "title": "Milk",
///       "description": null,
///       "priority": "Medium",
///       "assigned_to": "alice, bob",
///       "completed": false,
///       "task_list": "Groceries",
///       "category": "None"
///     }
///   }
/// ]
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use tasknest_shared::{
    auth::middleware::AuthContext,
    calendar::{build_feed, CalendarEvent},
};

/// Calendar feed handler
pub async fn home_feed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<CalendarEvent>>> {
    let events = build_feed(&state.db, auth.user_id).await?;

    Ok(Json(events))
}
