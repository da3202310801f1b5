use sqlx::PgPool;
use uuid::Uuid;

use crate::applies::views::{CandidateRow, EmployeeRow, MyApplyRow};
use crate::errors::AppError;
use crate::models::apply::{ApplyRow, ApplyStatus};
use crate::pagination::PageRequest;

pub async fn list_user_applies(
    pool: &PgPool,
    user_id: Uuid,
    page: PageRequest,
) -> Result<(i64, Vec<ApplyRow>), AppError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM applies a
        JOIN resumes rs ON rs.id = a.resume_id
        WHERE a.active AND rs.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, ApplyRow>(
        r#"
        SELECT a.* FROM applies a
        JOIN resumes rs ON rs.id = a.resume_id
        WHERE a.active AND rs.user_id = $1
        ORDER BY a.created_at DESC, a.id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((count, rows))
}

pub async fn find_active_apply(pool: &PgPool, id: Uuid) -> Result<Option<ApplyRow>, AppError> {
    Ok(
        sqlx::query_as::<_, ApplyRow>("SELECT * FROM applies WHERE id = $1 AND active")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn already_applied(
    pool: &PgPool,
    resume_id: Uuid,
    recruitment_id: Uuid,
) -> Result<bool, AppError> {
    Ok(sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM applies
            WHERE resume_id = $1 AND recruitment_id = $2 AND active
        )
        "#,
    )
    .bind(resume_id)
    .bind(recruitment_id)
    .fetch_one(pool)
    .await?)
}

pub async fn insert_apply(
    pool: &PgPool,
    resume_id: Uuid,
    recruitment_id: Uuid,
) -> Result<ApplyRow, sqlx::Error> {
    sqlx::query_as::<_, ApplyRow>(
        "INSERT INTO applies (resume_id, recruitment_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(resume_id)
    .bind(recruitment_id)
    .fetch_one(pool)
    .await
}

pub async fn set_apply_status(pool: &PgPool, id: Uuid, status: i16) -> Result<ApplyRow, AppError> {
    Ok(sqlx::query_as::<_, ApplyRow>(
        "UPDATE applies SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_one(pool)
    .await?)
}

pub async fn list_candidates(
    pool: &PgPool,
    recruitment_id: Uuid,
    page: PageRequest,
) -> Result<(i64, Vec<CandidateRow>), AppError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM applies WHERE active AND recruitment_id = $1",
    )
    .bind(recruitment_id)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, CandidateRow>(
        r#"
        SELECT a.id, a.status, a.resume_id, a.recruitment_id, a.active,
               a.created_at, a.updated_at,
               u.id AS user_id, u.first_name, u.last_name,
               u.email AS user_email, u.avatar_key AS user_avatar_key,
               rs.name AS resume_name, rs.cv_key AS resume_cv_key,
               rs.created_at AS resume_created_at
        FROM applies a
        JOIN resumes rs ON rs.id = a.resume_id
        JOIN users u ON u.id = rs.user_id
        WHERE a.active AND a.recruitment_id = $1
        ORDER BY a.status DESC, a.created_at, a.id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(recruitment_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((count, rows))
}

pub async fn list_employees(
    pool: &PgPool,
    company_id: Uuid,
    page: PageRequest,
) -> Result<(i64, Vec<EmployeeRow>), AppError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM applies a
        JOIN recruitments r ON r.id = a.recruitment_id
        WHERE a.active AND r.company_id = $1 AND a.status = $2
        "#,
    )
    .bind(company_id)
    .bind(ApplyStatus::HIRED_CODE)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, EmployeeRow>(
        r#"
        SELECT a.id, a.status, a.resume_id, a.recruitment_id, a.active,
               a.created_at, a.updated_at,
               u.id AS user_id, u.first_name, u.last_name,
               u.avatar_key AS user_avatar_key,
               r.title AS work
        FROM applies a
        JOIN recruitments r ON r.id = a.recruitment_id
        JOIN resumes rs ON rs.id = a.resume_id
        JOIN users u ON u.id = rs.user_id
        WHERE a.active AND r.company_id = $1 AND a.status = $2
        ORDER BY a.created_at, a.id
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(company_id)
    .bind(ApplyStatus::HIRED_CODE)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((count, rows))
}

/// The user's applications that are either hired or still point at a live
/// posting.
pub async fn list_my_applies(
    pool: &PgPool,
    user_id: Uuid,
    page: PageRequest,
) -> Result<(i64, Vec<MyApplyRow>), AppError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM applies a
        JOIN resumes rs ON rs.id = a.resume_id
        JOIN recruitments r ON r.id = a.recruitment_id
        WHERE a.active AND rs.user_id = $1 AND (a.status = $2 OR r.active)
        "#,
    )
    .bind(user_id)
    .bind(ApplyStatus::HIRED_CODE)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, MyApplyRow>(
        r#"
        SELECT a.id, a.status, a.resume_id, a.recruitment_id, a.active,
               a.created_at, a.updated_at,
               r.title AS work, c.id AS company_id, c.name AS company_name
        FROM applies a
        JOIN resumes rs ON rs.id = a.resume_id
        JOIN recruitments r ON r.id = a.recruitment_id
        JOIN companies c ON c.id = r.company_id
        WHERE a.active AND rs.user_id = $1 AND (a.status = $2 OR r.active)
        ORDER BY a.status, a.created_at, a.id
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(user_id)
    .bind(ApplyStatus::HIRED_CODE)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((count, rows))
}
