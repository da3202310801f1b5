use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{UserRole, UserRow};

pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: Option<&'a str>,
    pub role: UserRole,
    pub avatar_key: Option<&'a str>,
}

/// Optional changes; `None` keeps the stored value.
#[derive(Default)]
pub struct UserChanges<'a> {
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub role: Option<UserRole>,
    pub avatar_key: Option<&'a str>,
}

pub async fn find_active_user(pool: &PgPool, id: Uuid) -> Result<Option<UserRow>, AppError> {
    Ok(
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1 AND active")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn find_active_user_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<UserRow>, AppError> {
    Ok(
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1 AND active")
            .bind(username)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn username_taken(pool: &PgPool, username: &str) -> Result<bool, AppError> {
    Ok(
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await?,
    )
}

pub async fn insert_user(pool: &PgPool, new: NewUser<'_>) -> Result<UserRow, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users
            (username, password_hash, email, first_name, last_name, phone, role, avatar_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(new.username)
    .bind(new.password_hash)
    .bind(new.email)
    .bind(new.first_name)
    .bind(new.last_name)
    .bind(new.phone)
    .bind(new.role)
    .bind(new.avatar_key)
    .fetch_one(pool)
    .await
}

pub async fn update_user(
    pool: &PgPool,
    id: Uuid,
    changes: UserChanges<'_>,
) -> Result<UserRow, AppError> {
    Ok(sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users SET
            email = COALESCE($2, email),
            phone = COALESCE($3, phone),
            first_name = COALESCE($4, first_name),
            last_name = COALESCE($5, last_name),
            role = COALESCE($6, role),
            avatar_key = COALESCE($7, avatar_key),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(changes.email)
    .bind(changes.phone)
    .bind(changes.first_name)
    .bind(changes.last_name)
    .bind(changes.role)
    .bind(changes.avatar_key)
    .fetch_one(pool)
    .await?)
}
