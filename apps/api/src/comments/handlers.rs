use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::comments::queries::{find_comment, insert_comment, list_comments, update_comment};
use crate::comments::{check_content, CommentBoard};
use crate::companies::queries::{find_active_company, find_company_by_owner};
use crate::errors::AppError;
use crate::models::interaction::CommentRow;
use crate::models::user::UserRow;
use crate::pagination::{Page, PageQuery, PageRequest, COMMENT_PAGE_SIZE};
use crate::permissions::require_owner;
use crate::recruitments::filter::parse_id;
use crate::state::AppState;
use crate::users::queries::find_active_user;

#[derive(Debug, Default, Deserialize)]
pub struct UserCommentQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompanyCommentQuery {
    pub company_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserComment {
    /// Company being reviewed.
    pub company_id: Uuid,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCompanyComment {
    /// User being reviewed.
    pub user_id: Uuid,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct EditComment {
    pub content: String,
}

async fn page_of(
    state: &AppState,
    board: CommentBoard,
    filter: Option<Uuid>,
    page: &PageQuery,
) -> Result<Page<CommentRow>, AppError> {
    let request = PageRequest::new(page, COMMENT_PAGE_SIZE)?;
    let (count, rows) = list_comments(&state.db, board, filter, request).await?;
    Page::new(request, count, rows)
}

async fn authored_comment(
    state: &AppState,
    board: CommentBoard,
    user: &UserRow,
    id: Uuid,
) -> Result<CommentRow, AppError> {
    let comment = find_comment(&state.db, board, id)
        .await?
        .ok_or_else(|| AppError::not_found("Comment", id))?;
    match board {
        CommentBoard::User => require_owner(user, comment.user_id)?,
        CommentBoard::Company => {
            let company = find_active_company(&state.db, comment.company_id)
                .await?
                .ok_or(AppError::Forbidden)?;
            require_owner(user, company.user_id)?;
        }
    }
    Ok(comment)
}

/// GET /api/v1/user-comments
pub async fn handle_list_user_comments(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(filter): Query<UserCommentQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<CommentRow>>, AppError> {
    Ok(Json(
        page_of(
            &state,
            CommentBoard::User,
            parse_id("user_id", &filter.user_id)?,
            &page,
        )
        .await?,
    ))
}

/// POST /api/v1/user-comments
pub async fn handle_create_user_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateUserComment>,
) -> Result<(StatusCode, Json<CommentRow>), AppError> {
    let content = check_content(&req.content)?;
    if find_active_company(&state.db, req.company_id).await?.is_none() {
        return Err(AppError::invalid("company_id", "Unknown company."));
    }
    let comment =
        insert_comment(&state.db, CommentBoard::User, user.id, req.company_id, content).await?;
    info!("User {} reviewed company {}", user.id, req.company_id);
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH|PUT /api/v1/user-comments/:id
pub async fn handle_update_user_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<EditComment>,
) -> Result<Json<CommentRow>, AppError> {
    authored_comment(&state, CommentBoard::User, &user, id).await?;
    let content = check_content(&req.content)?;
    Ok(Json(
        update_comment(&state.db, CommentBoard::User, id, content).await?,
    ))
}

/// GET /api/v1/company-comments
pub async fn handle_list_company_comments(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(filter): Query<CompanyCommentQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<CommentRow>>, AppError> {
    Ok(Json(
        page_of(
            &state,
            CommentBoard::Company,
            parse_id("company_id", &filter.company_id)?,
            &page,
        )
        .await?,
    ))
}

/// POST /api/v1/company-comments
pub async fn handle_create_company_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateCompanyComment>,
) -> Result<(StatusCode, Json<CommentRow>), AppError> {
    let content = check_content(&req.content)?;
    let company = find_company_by_owner(&state.db, user.id)
        .await?
        .ok_or(AppError::Forbidden)?;
    if find_active_user(&state.db, req.user_id).await?.is_none() {
        return Err(AppError::invalid("user_id", "Unknown user."));
    }
    let comment = insert_comment(
        &state.db,
        CommentBoard::Company,
        req.user_id,
        company.id,
        content,
    )
    .await?;
    info!("Company {} reviewed user {}", company.id, req.user_id);
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH|PUT /api/v1/company-comments/:id
pub async fn handle_update_company_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<EditComment>,
) -> Result<Json<CommentRow>, AppError> {
    authored_comment(&state, CommentBoard::Company, &user, id).await?;
    let content = check_content(&req.content)?;
    Ok(Json(
        update_comment(&state.db, CommentBoard::Company, id, content).await?,
    ))
}
