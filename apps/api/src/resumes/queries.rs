use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::pagination::PageRequest;
use crate::recruitments::filter::parse_id;

/// Raw `?user_id=` / `?recruitment_id=` parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ResumeParams {
    pub user_id: Option<String>,
    pub recruitment_id: Option<String>,
}

impl ResumeParams {
    pub fn criteria(&self) -> Result<ResumeQuery, AppError> {
        Ok(ResumeQuery {
            user_id: parse_id("user_id", &self.user_id)?,
            recruitment_id: parse_id("recruitment_id", &self.recruitment_id)?,
        })
    }
}

/// Parsed filters for the resume listing.
#[derive(Debug, Default, PartialEq)]
pub struct ResumeQuery {
    pub user_id: Option<Uuid>,
    /// Resumes with an active application to this posting.
    pub recruitment_id: Option<Uuid>,
}

impl ResumeQuery {
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE rs.active");
        if let Some(user_id) = self.user_id {
            qb.push(" AND rs.user_id = ").push_bind(user_id);
        }
        if let Some(recruitment_id) = self.recruitment_id {
            qb.push(
                " AND EXISTS (SELECT 1 FROM applies a WHERE a.resume_id = rs.id AND a.active AND a.recruitment_id = ",
            )
            .push_bind(recruitment_id)
            .push(")");
        }
    }
}

pub async fn list_resumes(
    pool: &PgPool,
    query: &ResumeQuery,
    page: PageRequest,
) -> Result<(i64, Vec<ResumeRow>), AppError> {
    let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM resumes rs");
    query.push_where(&mut count_qb);
    let count = count_qb
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await?;

    let mut qb = QueryBuilder::<Postgres>::new("SELECT rs.* FROM resumes rs");
    query.push_where(&mut qb);
    qb.push(" ORDER BY rs.created_at, rs.id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = qb.build_query_as::<ResumeRow>().fetch_all(pool).await?;

    Ok((count, rows))
}

pub async fn count_active_resumes(pool: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
    Ok(
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM resumes WHERE user_id = $1 AND active")
            .bind(user_id)
            .fetch_one(pool)
            .await?,
    )
}

pub async fn find_active_resume(pool: &PgPool, id: Uuid) -> Result<Option<ResumeRow>, AppError> {
    Ok(
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND active")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Names are unique per user, soft-deleted resumes included.
pub async fn resume_name_taken(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<bool, AppError> {
    Ok(sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM resumes
            WHERE user_id = $1 AND name = $2 AND ($3::uuid IS NULL OR id <> $3)
        )
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(exclude)
    .fetch_one(pool)
    .await?)
}

pub async fn insert_resume(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    cv_key: Option<&str>,
) -> Result<ResumeRow, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        "INSERT INTO resumes (name, cv_key, user_id) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(name)
    .bind(cv_key)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn update_resume(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    cv_key: Option<&str>,
) -> Result<ResumeRow, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        r#"
        UPDATE resumes SET
            name = COALESCE($2, name),
            cv_key = COALESCE($3, cv_key),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(cv_key)
    .fetch_one(pool)
    .await
}

pub async fn deactivate_resume(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE resumes SET active = FALSE, updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_parse_ids_or_name_the_field() {
        let id = Uuid::new_v4();
        let params = ResumeParams {
            user_id: Some(id.to_string()),
            recruitment_id: Some("  ".to_string()),
        };
        assert_eq!(
            params.criteria().unwrap(),
            ResumeQuery {
                user_id: Some(id),
                recruitment_id: None,
            }
        );

        let bad = ResumeParams {
            recruitment_id: Some("42".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bad.criteria(),
            Err(AppError::Invalid { ref field, .. }) if field == "recruitment_id"
        ));
    }

    #[test]
    fn test_resume_filters_sql() {
        let query = ResumeQuery {
            user_id: Some(Uuid::new_v4()),
            recruitment_id: Some(Uuid::new_v4()),
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT rs.* FROM resumes rs");
        query.push_where(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT rs.* FROM resumes rs WHERE rs.active AND rs.user_id = $1 \
             AND EXISTS (SELECT 1 FROM applies a WHERE a.resume_id = rs.id AND a.active \
             AND a.recruitment_id = $2)"
        );
    }
}
