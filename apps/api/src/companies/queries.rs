use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::company::{CompanyImageRow, CompanyRow};
use crate::pagination::PageRequest;

pub async fn find_active_company(pool: &PgPool, id: Uuid) -> Result<Option<CompanyRow>, AppError> {
    Ok(
        sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE id = $1 AND active")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// The requester's own company, if any. A user owns at most one.
pub async fn find_company_by_owner(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<CompanyRow>, AppError> {
    Ok(
        sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE user_id = $1 AND active")
            .bind(user_id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn company_images(
    pool: &PgPool,
    company_id: Uuid,
) -> Result<Vec<CompanyImageRow>, AppError> {
    Ok(sqlx::query_as::<_, CompanyImageRow>(
        "SELECT * FROM company_images WHERE company_id = $1 AND active ORDER BY created_at, id",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await?)
}

pub async fn list_active_companies(
    pool: &PgPool,
    page: PageRequest,
) -> Result<(i64, Vec<CompanyRow>), AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies WHERE active")
        .fetch_one(pool)
        .await?;
    let rows = sqlx::query_as::<_, CompanyRow>(
        "SELECT * FROM companies WHERE active ORDER BY created_at, id LIMIT $1 OFFSET $2",
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok((count, rows))
}

/// Whether the user holds a company row at all, soft-deleted included;
/// `companies.user_id` is unique regardless of `active`.
pub async fn owns_any_company(pool: &PgPool, user_id: Uuid) -> Result<bool, AppError> {
    Ok(
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM companies WHERE user_id = $1)")
            .bind(user_id)
            .fetch_one(pool)
            .await?,
    )
}

pub async fn code_taken(pool: &PgPool, code: &str) -> Result<bool, AppError> {
    Ok(
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM companies WHERE code = $1)")
            .bind(code)
            .fetch_one(pool)
            .await?,
    )
}

/// Inserts the company and its images in one transaction.
pub async fn insert_company_with_images(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    code: &str,
    image_keys: &[String],
) -> Result<(CompanyRow, Vec<CompanyImageRow>), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let company = sqlx::query_as::<_, CompanyRow>(
        "INSERT INTO companies (name, code, user_id) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(name)
    .bind(code)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    let mut images = Vec::with_capacity(image_keys.len());
    for key in image_keys {
        let image = sqlx::query_as::<_, CompanyImageRow>(
            "INSERT INTO company_images (company_id, image_key) VALUES ($1, $2) RETURNING *",
        )
        .bind(company.id)
        .bind(key)
        .fetch_one(&mut *tx)
        .await?;
        images.push(image);
    }

    tx.commit().await?;
    info!(
        "Created company {} with {} image(s) for user {user_id}",
        company.id,
        images.len()
    );
    Ok((company, images))
}
