use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::company::CompanyRow;
use crate::models::interaction::FollowRow;

pub async fn list_user_follows(pool: &PgPool, user_id: Uuid) -> Result<Vec<FollowRow>, AppError> {
    Ok(sqlx::query_as::<_, FollowRow>(
        "SELECT * FROM follows WHERE user_id = $1 AND active ORDER BY created_at, id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn find_follow(pool: &PgPool, id: Uuid) -> Result<Option<FollowRow>, AppError> {
    Ok(
        sqlx::query_as::<_, FollowRow>("SELECT * FROM follows WHERE id = $1 AND active")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn is_following(pool: &PgPool, user_id: Uuid, company_id: Uuid) -> Result<bool, AppError> {
    Ok(sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND company_id = $2)",
    )
    .bind(user_id)
    .bind(company_id)
    .fetch_one(pool)
    .await?)
}

pub async fn insert_follow(
    pool: &PgPool,
    user_id: Uuid,
    company_id: Uuid,
) -> Result<FollowRow, sqlx::Error> {
    sqlx::query_as::<_, FollowRow>(
        "INSERT INTO follows (user_id, company_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(user_id)
    .bind(company_id)
    .fetch_one(pool)
    .await
}

/// Removes the row outright so the same pair can follow again later.
pub async fn delete_follow(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM follows WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn followed_companies(pool: &PgPool, user_id: Uuid) -> Result<Vec<CompanyRow>, AppError> {
    Ok(sqlx::query_as::<_, CompanyRow>(
        r#"
        SELECT c.* FROM companies c
        JOIN follows f ON f.company_id = c.id
        WHERE f.user_id = $1 AND f.active AND c.active
        ORDER BY f.created_at, c.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}
