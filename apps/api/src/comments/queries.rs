use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::comments::CommentBoard;
use crate::errors::AppError;
use crate::models::interaction::CommentRow;
use crate::pagination::PageRequest;

fn push_where(qb: &mut QueryBuilder<'_, Postgres>, board: CommentBoard, filter: Option<Uuid>) {
    qb.push(" WHERE active");
    if let Some(id) = filter {
        qb.push(" AND ")
            .push(board.filter_column())
            .push(" = ")
            .push_bind(id);
    }
}

pub async fn list_comments(
    pool: &PgPool,
    board: CommentBoard,
    filter: Option<Uuid>,
    page: PageRequest,
) -> Result<(i64, Vec<CommentRow>), AppError> {
    let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ");
    count_qb.push(board.table());
    push_where(&mut count_qb, board, filter);
    let count = count_qb
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await?;

    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM ");
    qb.push(board.table());
    push_where(&mut qb, board, filter);
    qb.push(" ORDER BY created_at, id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = qb.build_query_as::<CommentRow>().fetch_all(pool).await?;

    Ok((count, rows))
}

pub async fn find_comment(
    pool: &PgPool,
    board: CommentBoard,
    id: Uuid,
) -> Result<Option<CommentRow>, AppError> {
    let sql = format!("SELECT * FROM {} WHERE id = $1 AND active", board.table());
    Ok(sqlx::query_as::<_, CommentRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn insert_comment(
    pool: &PgPool,
    board: CommentBoard,
    user_id: Uuid,
    company_id: Uuid,
    content: &str,
) -> Result<CommentRow, AppError> {
    let sql = format!(
        "INSERT INTO {} (user_id, company_id, content) VALUES ($1, $2, $3) RETURNING *",
        board.table()
    );
    Ok(sqlx::query_as::<_, CommentRow>(&sql)
        .bind(user_id)
        .bind(company_id)
        .bind(content)
        .fetch_one(pool)
        .await?)
}

pub async fn update_comment(
    pool: &PgPool,
    board: CommentBoard,
    id: Uuid,
    content: &str,
) -> Result<CommentRow, AppError> {
    let sql = format!(
        "UPDATE {} SET content = $2, updated_at = now() WHERE id = $1 RETURNING *",
        board.table()
    );
    Ok(sqlx::query_as::<_, CommentRow>(&sql)
        .bind(id)
        .bind(content)
        .fetch_one(pool)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_targets_board_column() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM ");
        qb.push(CommentBoard::Company.table());
        push_where(&mut qb, CommentBoard::Company, Some(Uuid::new_v4()));
        assert_eq!(
            qb.sql(),
            "SELECT * FROM company_comments WHERE active AND company_id = $1"
        );
    }

    #[test]
    fn test_no_filter_lists_all_active() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM ");
        qb.push(CommentBoard::User.table());
        push_where(&mut qb, CommentBoard::User, None);
        assert_eq!(qb.sql(), "SELECT * FROM user_comments WHERE active");
    }
}
