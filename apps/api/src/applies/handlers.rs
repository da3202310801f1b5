use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::applies::queries::{
    already_applied, find_active_apply, insert_apply, list_candidates, list_employees,
    list_my_applies, list_user_applies, set_apply_status,
};
use crate::applies::views::{ApplyView, CandidateView, EmployeeView, MyApplyRow};
use crate::auth::AuthUser;
use crate::companies::queries::find_active_company;
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::models::apply::ApplyStatus;
use crate::models::user::UserRow;
use crate::pagination::{Page, PageQuery, PageRequest, APPLY_PAGE_SIZE};
use crate::permissions::{require_owner, require_recruitment_owner};
use crate::recruitments::queries::{find_active_recruitment, recruitment_owner};
use crate::resumes::queries::find_active_resume;
use crate::state::AppState;

const DUPLICATE_APPLY: &str = "You have already applied to this recruitment with this resume.";

#[derive(Debug, Deserialize)]
pub struct CreateApply {
    pub resume_id: Uuid,
    pub recruitment_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: i16,
}

fn check_status(status: i16) -> Result<ApplyStatus, AppError> {
    if status < 0 {
        return Err(AppError::invalid("status", "Status cannot be negative."));
    }
    Ok(ApplyStatus::from(status))
}

async fn require_recruitment_owner_of(
    state: &AppState,
    user: &UserRow,
    recruitment_id: Uuid,
) -> Result<(), AppError> {
    let owner = recruitment_owner(&state.db, recruitment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Recruitment", recruitment_id))?;
    require_recruitment_owner(user, owner)
}

/// GET /api/v1/applies
pub async fn handle_list_applies(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<ApplyView>>, AppError> {
    let request = PageRequest::new(&page, APPLY_PAGE_SIZE)?;
    let (count, rows) = list_user_applies(&state.db, user.id, request).await?;
    Ok(Json(Page::new(request, count, rows)?.map(ApplyView::from)))
}

/// POST /api/v1/applies
pub async fn handle_create_apply(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateApply>,
) -> Result<(StatusCode, Json<ApplyView>), AppError> {
    let resume = find_active_resume(&state.db, req.resume_id)
        .await?
        .ok_or_else(|| AppError::invalid("resume_id", "Unknown resume."))?;
    require_owner(&user, resume.user_id)?;

    if find_active_recruitment(&state.db, req.recruitment_id)
        .await?
        .is_none()
    {
        return Err(AppError::invalid("recruitment_id", "Unknown recruitment."));
    }

    if already_applied(&state.db, resume.id, req.recruitment_id).await? {
        return Err(AppError::invalid("resume_id", DUPLICATE_APPLY));
    }

    let apply = insert_apply(&state.db, resume.id, req.recruitment_id)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::invalid("resume_id", DUPLICATE_APPLY)
            } else {
                AppError::Database(e)
            }
        })?;

    info!(
        "Resume {} applied to recruitment {}",
        apply.resume_id, apply.recruitment_id
    );
    Ok((StatusCode::CREATED, Json(apply.into())))
}

/// PATCH /api/v1/applies/:id/change
pub async fn handle_change_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusChange>,
) -> Result<Json<ApplyView>, AppError> {
    let status = check_status(req.status)?;
    let apply = find_active_apply(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Apply", id))?;
    require_recruitment_owner_of(&state, &user, apply.recruitment_id).await?;

    let updated = set_apply_status(&state.db, id, status.code()).await?;
    info!("Apply {id} moved to {}", status.label());
    Ok(Json(updated.into()))
}

/// GET /api/v1/applies/candidate/:recruitment_id
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(recruitment_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<CandidateView>>, AppError> {
    require_recruitment_owner_of(&state, &user, recruitment_id).await?;

    let request = PageRequest::new(&page, APPLY_PAGE_SIZE)?;
    let (count, rows) = list_candidates(&state.db, recruitment_id, request).await?;
    let storage = &state.storage;
    Ok(Json(
        Page::new(request, count, rows)?.map(|row| CandidateView::new(row, storage)),
    ))
}

/// GET /api/v1/applies/employee/:company_id
pub async fn handle_list_employees(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(company_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<EmployeeView>>, AppError> {
    let company = find_active_company(&state.db, company_id)
        .await?
        .ok_or_else(|| AppError::not_found("Company", company_id))?;
    require_owner(&user, company.user_id)?;

    let request = PageRequest::new(&page, APPLY_PAGE_SIZE)?;
    let (count, rows) = list_employees(&state.db, company.id, request).await?;
    let storage = &state.storage;
    Ok(Json(
        Page::new(request, count, rows)?.map(|row| EmployeeView::new(row, storage)),
    ))
}

/// GET /api/v1/applies/mine
pub async fn handle_my_applies(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<MyApplyRow>>, AppError> {
    let request = PageRequest::new(&page, APPLY_PAGE_SIZE)?;
    let (count, rows) = list_my_applies(&state.db, user.id, request).await?;
    Ok(Json(Page::new(request, count, rows)?))
}
