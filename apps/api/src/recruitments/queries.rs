use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::recruitment::RecruitmentRow;
use crate::pagination::PageRequest;
use crate::recruitments::filter::RecruitmentCriteria;

pub struct NewRecruitment<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub skills_required: &'a str,
    pub salary: Decimal,
    pub work_time_start: DateTime<Utc>,
    pub location: &'a str,
    pub category_id: Uuid,
    pub work_type_id: Option<Uuid>,
    pub company_id: Uuid,
}

#[derive(Default)]
pub struct RecruitmentChanges<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub skills_required: Option<&'a str>,
    pub salary: Option<Decimal>,
    pub work_time_start: Option<DateTime<Utc>>,
    pub location: Option<&'a str>,
    pub category_id: Option<Uuid>,
    /// `Some(None)` clears the work type.
    pub work_type_id: Option<Option<Uuid>>,
}

pub async fn list_recruitments(
    pool: &PgPool,
    criteria: &RecruitmentCriteria,
    page: PageRequest,
) -> Result<(i64, Vec<RecruitmentRow>), AppError> {
    let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recruitments r");
    criteria.push_where(&mut count_qb);
    let count = count_qb
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await?;

    let mut qb = QueryBuilder::<Postgres>::new("SELECT r.* FROM recruitments r");
    criteria.push_where(&mut qb);
    qb.push(" ORDER BY r.created_at, r.id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = qb.build_query_as::<RecruitmentRow>().fetch_all(pool).await?;

    Ok((count, rows))
}

pub async fn find_active_recruitment(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<RecruitmentRow>, AppError> {
    Ok(
        sqlx::query_as::<_, RecruitmentRow>("SELECT * FROM recruitments WHERE id = $1 AND active")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Owner (company user) of a recruitment, whatever its `active` state.
pub async fn recruitment_owner(pool: &PgPool, id: Uuid) -> Result<Option<Uuid>, AppError> {
    Ok(sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT c.user_id
        FROM recruitments r
        JOIN companies c ON c.id = r.company_id
        WHERE r.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

pub async fn category_is_active(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    Ok(sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND active)",
    )
    .bind(id)
    .fetch_one(pool)
    .await?)
}

pub async fn work_type_is_active(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    Ok(sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM work_types WHERE id = $1 AND active)",
    )
    .bind(id)
    .fetch_one(pool)
    .await?)
}

pub async fn insert_recruitment(
    pool: &PgPool,
    new: NewRecruitment<'_>,
) -> Result<RecruitmentRow, AppError> {
    Ok(sqlx::query_as::<_, RecruitmentRow>(
        r#"
        INSERT INTO recruitments
            (title, description, skills_required, salary, work_time_start,
             location, category_id, work_type_id, company_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(new.title)
    .bind(new.description)
    .bind(new.skills_required)
    .bind(new.salary)
    .bind(new.work_time_start)
    .bind(new.location)
    .bind(new.category_id)
    .bind(new.work_type_id)
    .bind(new.company_id)
    .fetch_one(pool)
    .await?)
}

pub async fn update_recruitment(
    pool: &PgPool,
    id: Uuid,
    changes: RecruitmentChanges<'_>,
) -> Result<RecruitmentRow, AppError> {
    Ok(sqlx::query_as::<_, RecruitmentRow>(
        r#"
        UPDATE recruitments SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            skills_required = COALESCE($4, skills_required),
            salary = COALESCE($5, salary),
            work_time_start = COALESCE($6, work_time_start),
            location = COALESCE($7, location),
            category_id = COALESCE($8, category_id),
            work_type_id = CASE WHEN $10 THEN $9 ELSE work_type_id END,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(changes.title)
    .bind(changes.description)
    .bind(changes.skills_required)
    .bind(changes.salary)
    .bind(changes.work_time_start)
    .bind(changes.location)
    .bind(changes.category_id)
    .bind(changes.work_type_id.flatten())
    .bind(changes.work_type_id.is_some())
    .fetch_one(pool)
    .await?)
}

pub async fn set_recruitment_active(
    pool: &PgPool,
    id: Uuid,
    active: bool,
) -> Result<RecruitmentRow, AppError> {
    Ok(sqlx::query_as::<_, RecruitmentRow>(
        "UPDATE recruitments SET active = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(active)
    .fetch_one(pool)
    .await?)
}

/// Whether any of the user's resumes has an active application to the posting.
pub async fn has_applied(pool: &PgPool, user_id: Uuid, recruitment_id: Uuid) -> Result<bool, AppError> {
    Ok(sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1
            FROM applies a
            JOIN resumes rs ON rs.id = a.resume_id
            WHERE rs.user_id = $1 AND a.recruitment_id = $2 AND a.active
        )
        "#,
    )
    .bind(user_id)
    .bind(recruitment_id)
    .fetch_one(pool)
    .await?)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::models::user::UserRole;
    use crate::recruitments::filter::RecruitmentQuery;
    use crate::state::testing::{seed_category, seed_company, seed_user, test_db};

    fn posting(title: &str, category_id: Uuid, company_id: Uuid) -> NewRecruitment<'_> {
        NewRecruitment {
            title,
            description: "Build the job board",
            skills_required: "rust",
            salary: Decimal::from_str("1500.00").unwrap(),
            work_time_start: Utc::now(),
            location: "Da Nang",
            category_id,
            work_type_id: None,
            company_id,
        }
    }

    #[tokio::test]
    async fn test_category_listing_returns_only_active_matches() {
        let Some(pool) = test_db().await else { return };
        let company = seed_company(&pool, &seed_user(&pool, UserRole::Employer).await, true).await;
        let wanted = seed_category(&pool).await;
        let other = seed_category(&pool).await;

        let open = insert_recruitment(&pool, posting("open", wanted.id, company.id))
            .await
            .unwrap();
        let closed = insert_recruitment(&pool, posting("closed", wanted.id, company.id))
            .await
            .unwrap();
        set_recruitment_active(&pool, closed.id, false).await.unwrap();
        insert_recruitment(&pool, posting("elsewhere", other.id, company.id))
            .await
            .unwrap();

        let criteria = RecruitmentQuery {
            category_id: Some(wanted.id.to_string()),
            ..Default::default()
        }
        .criteria()
        .unwrap();
        let page = PageRequest { number: 1, size: 10 };
        let (count, rows) = list_recruitments(&pool, &criteria, page).await.unwrap();

        assert_eq!(count, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, open.id);
    }

    #[tokio::test]
    async fn test_null_work_type_clears_it() {
        let Some(pool) = test_db().await else { return };
        let company = seed_company(&pool, &seed_user(&pool, UserRole::Employer).await, true).await;
        let category = seed_category(&pool).await;
        let work_type: Uuid = sqlx::query_scalar(
            "INSERT INTO work_types (name) VALUES ('Remote ' || gen_random_uuid()) RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        let mut new = posting("remote", category.id, company.id);
        new.work_type_id = Some(work_type);
        let created = insert_recruitment(&pool, new).await.unwrap();

        let kept = update_recruitment(
            &pool,
            created.id,
            RecruitmentChanges {
                title: Some("renamed"),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(kept.work_type_id, Some(work_type));

        let cleared = update_recruitment(
            &pool,
            created.id,
            RecruitmentChanges {
                work_type_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared.work_type_id, None);
        assert_eq!(cleared.title, "renamed");
    }
}
