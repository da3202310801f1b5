use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::catalog::{CategoryRow, WorkTypeRow};

pub async fn list_active_categories(pool: &PgPool) -> Result<Vec<CategoryRow>, AppError> {
    Ok(
        sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories WHERE active ORDER BY name")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn list_active_work_types(pool: &PgPool) -> Result<Vec<WorkTypeRow>, AppError> {
    Ok(
        sqlx::query_as::<_, WorkTypeRow>("SELECT * FROM work_types WHERE active ORDER BY name")
            .fetch_all(pool)
            .await?,
    )
}
