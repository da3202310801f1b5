use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::companies::handlers::check_length;
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::models::user::UserRow;
use crate::pagination::{Page, PageQuery, PageRequest, RESUME_PAGE_SIZE};
use crate::permissions::require_owner;
use crate::resumes::queries::{
    deactivate_resume, find_active_resume, insert_resume, list_resumes, resume_name_taken,
    update_resume, ResumeParams, ResumeQuery,
};
use crate::resumes::{ResumeView, MAX_NAME_LEN};
use crate::state::AppState;
use crate::storage::FormData;

fn duplicate_name() -> AppError {
    AppError::invalid("name", "You already have a resume with this name.")
}

fn map_insert_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        duplicate_name()
    } else {
        AppError::Database(err)
    }
}

async fn owned_resume(state: &AppState, user: &UserRow, id: Uuid) -> Result<ResumeRow, AppError> {
    let resume = find_active_resume(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Resume", id))?;
    require_owner(user, resume.user_id)?;
    Ok(resume)
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<ResumeParams>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<ResumeView>>, AppError> {
    let filters = params.criteria()?;
    let request = PageRequest::new(&page, RESUME_PAGE_SIZE)?;
    let (count, rows) = list_resumes(&state.db, &filters, request).await?;
    Ok(Json(
        Page::new(request, count, rows)?.map(|r| ResumeView::new(r, &state.storage)),
    ))
}

/// GET /api/v1/resumes/owner
pub async fn handle_owner_resumes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<ResumeView>>, AppError> {
    let request = PageRequest::new(&page, RESUME_PAGE_SIZE)?;
    let filters = ResumeQuery {
        user_id: Some(user.id),
        recruitment_id: None,
    };
    let (count, rows) = list_resumes(&state.db, &filters, request).await?;
    Ok(Json(
        Page::new(request, count, rows)?.map(|r| ResumeView::new(r, &state.storage)),
    ))
}

/// POST /api/v1/resumes (multipart: name, cv)
pub async fn handle_create_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeView>), AppError> {
    let mut form = FormData::from_multipart(multipart).await?;
    let name = form.require("name")?.to_string();
    check_length("name", &name, MAX_NAME_LEN)?;

    if resume_name_taken(&state.db, user.id, &name, None).await? {
        return Err(duplicate_name());
    }

    let cv_key = match form.take_file("cv") {
        Some(file) => Some(state.storage.put("resumes", file).await?),
        None => None,
    };

    let resume = insert_resume(&state.db, user.id, &name, cv_key.as_deref())
        .await
        .map_err(map_insert_error)?;
    info!("User {} created resume {}", user.id, resume.id);

    Ok((
        StatusCode::CREATED,
        Json(ResumeView::new(resume, &state.storage)),
    ))
}

/// PATCH|PUT /api/v1/resumes/:id (multipart: name, cv)
pub async fn handle_update_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ResumeView>, AppError> {
    owned_resume(&state, &user, id).await?;

    let mut form = FormData::from_multipart(multipart).await?;
    let name = form.text("name").map(str::to_string);
    if let Some(name) = &name {
        check_length("name", name, MAX_NAME_LEN)?;
        if resume_name_taken(&state.db, user.id, name, Some(id)).await? {
            return Err(duplicate_name());
        }
    }

    let cv_key = match form.take_file("cv") {
        Some(file) => Some(state.storage.put("resumes", file).await?),
        None => None,
    };

    let updated = update_resume(&state.db, id, name.as_deref(), cv_key.as_deref())
        .await
        .map_err(map_insert_error)?;
    Ok(Json(ResumeView::new(updated, &state.storage)))
}

/// DELETE /api/v1/resumes/:id (soft delete)
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    owned_resume(&state, &user, id).await?;
    deactivate_resume(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
