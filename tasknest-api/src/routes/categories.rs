/// Category endpoints
///
/// Reads return the user's visible set: categories they created plus
/// categories attached to tasks in lists shared with them. Writes are
/// creator-only.
///
/// # Endpoints
///
/// - `GET    /v1/categories` - Visible categories
/// - `POST   /v1/categories` - Create category
/// - `PUT    /v1/categories/:id` - Rename (creator only)
/// - `DELETE /v1/categories/:id` - Delete (creator only; tasks keep
///   existing with their category cleared)

use crate::{
    app::AppState,
    error::{validation_failed, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use tasknest_shared::{
    auth::{access::require_category_ownership, middleware::AuthContext},
    models::category::{Category, CreateCategory},
};
use uuid::Uuid;
use validator::Validate;

/// Create/rename request
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryPayload {
    /// Category name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Lists the categories visible to the acting user
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = Category::visible_to_user(&state.db, auth.user_id).await?;

    Ok(Json(categories))
}

/// Creates a category owned by the acting user
pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CategoryPayload>,
) -> ApiResult<Json<Category>> {
    payload.validate().map_err(validation_failed)?;

    let category = Category::create(
        &state.db,
        CreateCategory {
            name: payload.name,
            created_by: auth.user_id,
        },
    )
    .await?;

    Ok(Json(category))
}

/// Renames a category (creator only)
pub async fn update_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> ApiResult<Json<Category>> {
    let category = Category::find_by_id(&state.db, category_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    require_category_ownership(&category, auth.user_id)?;

    payload.validate().map_err(validation_failed)?;

    let updated = Category::update_name(&state.db, category.id, &payload.name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(updated))
}

/// Deletes a category (creator only)
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(category_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let category = Category::find_by_id(&state.db, category_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    require_category_ownership(&category, auth.user_id)?;

    Category::delete(&state.db, category.id).await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        let payload = CategoryPayload {
            name: String::new(),
        };
        assert!(payload.validate().is_err());

        let payload = CategoryPayload {
            name: "Errands".to_string(),
        };
        assert!(payload.validate().is_ok());

        let payload = CategoryPayload {
            name: "x".repeat(101),
        };
        assert!(payload.validate().is_err());
    }
}
