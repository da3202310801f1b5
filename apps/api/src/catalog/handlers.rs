use axum::{extract::State, Json};

use crate::catalog::queries::{list_active_categories, list_active_work_types};
use crate::errors::AppError;
use crate::models::catalog::{CategoryRow, WorkTypeRow};
use crate::state::AppState;

/// GET /api/v1/categories
pub async fn handle_list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryRow>>, AppError> {
    Ok(Json(list_active_categories(&state.db).await?))
}

/// GET /api/v1/work-types
pub async fn handle_list_work_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<WorkTypeRow>>, AppError> {
    Ok(Json(list_active_work_types(&state.db).await?))
}
