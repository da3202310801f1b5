//! Unfiltered data access for staff. Soft-deleted rows are visible here and
//! deletes are physical.

use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::catalog::{CategoryRow, WorkTypeRow};
use crate::models::company::CompanyRow;
use crate::pagination::PageRequest;

/// Company list row with the owner's username.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminCompanyRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub company: CompanyRow,
    pub owner_username: String,
}

#[derive(Debug, Default)]
pub struct CatalogChanges<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub active: Option<bool>,
}

#[derive(Debug, Default)]
pub struct CompanyChanges<'a> {
    pub name: Option<&'a str>,
    pub code: Option<&'a str>,
    pub verified: Option<bool>,
    pub active: Option<bool>,
}

pub async fn list_categories(
    pool: &PgPool,
    page: PageRequest,
) -> Result<(i64, Vec<CategoryRow>), AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;
    let rows = sqlx::query_as::<_, CategoryRow>(
        "SELECT * FROM categories ORDER BY name LIMIT $1 OFFSET $2",
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok((count, rows))
}

pub async fn find_category(pool: &PgPool, id: Uuid) -> Result<Option<CategoryRow>, AppError> {
    Ok(
        sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn insert_category(
    pool: &PgPool,
    name: &str,
    description: &str,
) -> Result<CategoryRow, sqlx::Error> {
    sqlx::query_as::<_, CategoryRow>(
        "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING *",
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn update_category(
    pool: &PgPool,
    id: Uuid,
    changes: CatalogChanges<'_>,
) -> Result<Option<CategoryRow>, sqlx::Error> {
    sqlx::query_as::<_, CategoryRow>(
        r#"
        UPDATE categories SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            active = COALESCE($4, active),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(changes.name)
    .bind(changes.description)
    .bind(changes.active)
    .fetch_optional(pool)
    .await
}

pub async fn list_work_types(
    pool: &PgPool,
    page: PageRequest,
) -> Result<(i64, Vec<WorkTypeRow>), AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM work_types")
        .fetch_one(pool)
        .await?;
    let rows = sqlx::query_as::<_, WorkTypeRow>(
        "SELECT * FROM work_types ORDER BY name LIMIT $1 OFFSET $2",
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok((count, rows))
}

pub async fn find_work_type(pool: &PgPool, id: Uuid) -> Result<Option<WorkTypeRow>, AppError> {
    Ok(
        sqlx::query_as::<_, WorkTypeRow>("SELECT * FROM work_types WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn insert_work_type(pool: &PgPool, name: &str) -> Result<WorkTypeRow, sqlx::Error> {
    sqlx::query_as::<_, WorkTypeRow>("INSERT INTO work_types (name) VALUES ($1) RETURNING *")
        .bind(name)
        .fetch_one(pool)
        .await
}

pub async fn update_work_type(
    pool: &PgPool,
    id: Uuid,
    changes: CatalogChanges<'_>,
) -> Result<Option<WorkTypeRow>, sqlx::Error> {
    sqlx::query_as::<_, WorkTypeRow>(
        r#"
        UPDATE work_types SET
            name = COALESCE($2, name),
            active = COALESCE($3, active),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(changes.name)
    .bind(changes.active)
    .fetch_optional(pool)
    .await
}

fn push_company_filter(qb: &mut QueryBuilder<'_, Postgres>, verified: Option<bool>) {
    if let Some(verified) = verified {
        qb.push(" WHERE c.verified = ").push_bind(verified);
    }
}

pub async fn list_companies(
    pool: &PgPool,
    verified: Option<bool>,
    page: PageRequest,
) -> Result<(i64, Vec<AdminCompanyRow>), AppError> {
    let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM companies c");
    push_company_filter(&mut count_qb, verified);
    let count = count_qb
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await?;

    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT c.*, u.username AS owner_username FROM companies c JOIN users u ON u.id = c.user_id",
    );
    push_company_filter(&mut qb, verified);
    qb.push(" ORDER BY c.created_at, c.id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = qb.build_query_as::<AdminCompanyRow>().fetch_all(pool).await?;

    Ok((count, rows))
}

pub async fn find_company(pool: &PgPool, id: Uuid) -> Result<Option<AdminCompanyRow>, AppError> {
    Ok(sqlx::query_as::<_, AdminCompanyRow>(
        r#"
        SELECT c.*, u.username AS owner_username
        FROM companies c JOIN users u ON u.id = c.user_id
        WHERE c.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

pub async fn insert_company(
    pool: &PgPool,
    name: &str,
    code: &str,
    user_id: Uuid,
    verified: bool,
) -> Result<CompanyRow, sqlx::Error> {
    sqlx::query_as::<_, CompanyRow>(
        "INSERT INTO companies (name, code, user_id, verified) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(name)
    .bind(code)
    .bind(user_id)
    .bind(verified)
    .fetch_one(pool)
    .await
}

pub async fn update_company(
    pool: &PgPool,
    id: Uuid,
    changes: CompanyChanges<'_>,
) -> Result<Option<CompanyRow>, sqlx::Error> {
    sqlx::query_as::<_, CompanyRow>(
        r#"
        UPDATE companies SET
            name = COALESCE($2, name),
            code = COALESCE($3, code),
            verified = COALESCE($4, verified),
            active = COALESCE($5, active),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(changes.name)
    .bind(changes.code)
    .bind(changes.verified)
    .bind(changes.active)
    .fetch_optional(pool)
    .await
}

/// Marks exactly one company verified. Returns `None` for an unknown id.
pub async fn verify_company(pool: &PgPool, id: Uuid) -> Result<Option<CompanyRow>, AppError> {
    Ok(sqlx::query_as::<_, CompanyRow>(
        "UPDATE companies SET verified = TRUE, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

/// Physical delete from one of the admin-managed tables. Returns whether a
/// row was removed.
pub async fn delete_row(pool: &PgPool, table: AdminTable, id: Uuid) -> Result<bool, AppError> {
    let sql = format!("DELETE FROM {} WHERE id = $1", table.name());
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTable {
    Categories,
    WorkTypes,
    Companies,
}

impl AdminTable {
    fn name(self) -> &'static str {
        match self {
            AdminTable::Categories => "categories",
            AdminTable::WorkTypes => "work_types",
            AdminTable::Companies => "companies",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use crate::state::testing::{seed_company, seed_user, test_db};

    #[test]
    fn test_company_filter_only_when_requested() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM companies c");
        push_company_filter(&mut qb, None);
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM companies c");

        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM companies c");
        push_company_filter(&mut qb, Some(false));
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM companies c WHERE c.verified = $1");
    }

    #[test]
    fn test_table_names() {
        assert_eq!(AdminTable::Categories.name(), "categories");
        assert_eq!(AdminTable::WorkTypes.name(), "work_types");
        assert_eq!(AdminTable::Companies.name(), "companies");
    }

    #[tokio::test]
    async fn test_verify_flips_exactly_one_company() {
        let Some(pool) = test_db().await else { return };
        let first = seed_company(&pool, &seed_user(&pool, UserRole::Employer).await, false).await;
        let second = seed_company(&pool, &seed_user(&pool, UserRole::Employer).await, false).await;

        let verified = verify_company(&pool, first.id).await.unwrap().unwrap();
        assert!(verified.verified);
        assert_eq!(verified.id, first.id);

        let untouched = find_company(&pool, second.id).await.unwrap().unwrap();
        assert!(!untouched.company.verified);

        assert!(verify_company(&pool, Uuid::new_v4()).await.unwrap().is_none());
    }
}
