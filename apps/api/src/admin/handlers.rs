use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::admin::queries::{
    delete_row, find_category, find_company, find_work_type, insert_category, insert_company,
    insert_work_type, list_categories, list_companies, list_work_types, update_category,
    update_company, update_work_type, verify_company, AdminCompanyRow, AdminTable,
    CatalogChanges, CompanyChanges,
};
use crate::admin::stats::{recruitment_stats, RecruitmentStats, StatsQuery};
use crate::auth::StaffUser;
use crate::companies::handlers::{check_length, company_write_error};
use crate::companies::{MAX_CODE_LEN, MAX_NAME_LEN};
use crate::config::parse_flag;
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::models::catalog::{CategoryRow, WorkTypeRow};
use crate::models::company::CompanyRow;
use crate::pagination::{Page, PageQuery, PageRequest, ADMIN_PAGE_SIZE};
use crate::state::AppState;
use crate::users::queries::find_active_user;

const MAX_CATALOG_NAME_LEN: usize = 100;

fn unique_or(field: &'static str, message: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        if is_unique_violation(&e) {
            AppError::invalid(field, message)
        } else {
            AppError::Database(e)
        }
    }
}

/// Trimmed, non-blank and at most `max` characters.
fn required_text<'a>(field: &str, value: &'a str, max: usize) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::invalid(field, "This field may not be blank."));
    }
    check_length(field, value, max)?;
    Ok(value)
}

fn required_name(name: &str) -> Result<&str, AppError> {
    required_text("name", name, MAX_CATALOG_NAME_LEN)
}

async fn deleted_or_404(
    state: &AppState,
    table: AdminTable,
    what: &str,
    id: Uuid,
) -> Result<StatusCode, AppError> {
    if !delete_row(&state.db, table, id).await? {
        return Err(AppError::not_found(what, id));
    }
    info!("Admin deleted {what} {id}");
    Ok(StatusCode::NO_CONTENT)
}

// ── Categories ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

/// GET /admin/categories
pub async fn handle_list_categories(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<CategoryRow>>, AppError> {
    let request = PageRequest::new(&page, ADMIN_PAGE_SIZE)?;
    let (count, rows) = list_categories(&state.db, request).await?;
    Ok(Json(Page::new(request, count, rows)?))
}

/// POST /admin/categories
pub async fn handle_create_category(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Json(form): Json<CategoryForm>,
) -> Result<(StatusCode, Json<CategoryRow>), AppError> {
    let name = required_name(&form.name)?;
    check_length("description", &form.description, 255)?;
    let category = insert_category(&state.db, name, form.description.trim())
        .await
        .map_err(unique_or("name", "Category with this name already exists."))?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /admin/categories/:id
pub async fn handle_get_category(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryRow>, AppError> {
    find_category(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Category", id))
}

/// PATCH /admin/categories/:id
pub async fn handle_update_category(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
    Json(form): Json<CategoryUpdate>,
) -> Result<Json<CategoryRow>, AppError> {
    let name = form.name.as_deref().map(required_name).transpose()?;
    if let Some(description) = &form.description {
        check_length("description", description, 255)?;
    }
    update_category(
        &state.db,
        id,
        CatalogChanges {
            name,
            description: form.description.as_deref().map(str::trim),
            active: form.active,
        },
    )
    .await
    .map_err(unique_or("name", "Category with this name already exists."))?
    .map(Json)
    .ok_or_else(|| AppError::not_found("Category", id))
}

/// DELETE /admin/categories/:id
pub async fn handle_delete_category(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    deleted_or_404(&state, AdminTable::Categories, "Category", id).await
}

// ── Work types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct WorkTypeForm {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkTypeUpdate {
    pub name: Option<String>,
    pub active: Option<bool>,
}

/// GET /admin/work-types
pub async fn handle_list_work_types(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<WorkTypeRow>>, AppError> {
    let request = PageRequest::new(&page, ADMIN_PAGE_SIZE)?;
    let (count, rows) = list_work_types(&state.db, request).await?;
    Ok(Json(Page::new(request, count, rows)?))
}

/// POST /admin/work-types
pub async fn handle_create_work_type(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Json(form): Json<WorkTypeForm>,
) -> Result<(StatusCode, Json<WorkTypeRow>), AppError> {
    let name = required_name(&form.name)?;
    let work_type = insert_work_type(&state.db, name)
        .await
        .map_err(unique_or("name", "Work type with this name already exists."))?;
    Ok((StatusCode::CREATED, Json(work_type)))
}

/// GET /admin/work-types/:id
pub async fn handle_get_work_type(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkTypeRow>, AppError> {
    find_work_type(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Work type", id))
}

/// PATCH /admin/work-types/:id
pub async fn handle_update_work_type(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
    Json(form): Json<WorkTypeUpdate>,
) -> Result<Json<WorkTypeRow>, AppError> {
    let name = form.name.as_deref().map(required_name).transpose()?;
    update_work_type(
        &state.db,
        id,
        CatalogChanges {
            name,
            active: form.active,
            ..Default::default()
        },
    )
    .await
    .map_err(unique_or("name", "Work type with this name already exists."))?
    .map(Json)
    .ok_or_else(|| AppError::not_found("Work type", id))
}

/// DELETE /admin/work-types/:id
pub async fn handle_delete_work_type(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    deleted_or_404(&state, AdminTable::WorkTypes, "Work type", id).await
}

// ── Companies ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CompanyListQuery {
    /// `?verified=true|false`; anything else lists every company.
    pub verified: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompanyForm {
    pub name: String,
    pub code: String,
    pub user_id: Uuid,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub verified: Option<bool>,
    pub active: Option<bool>,
}

/// GET /admin/companies
pub async fn handle_list_companies(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Query(filter): Query<CompanyListQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<AdminCompanyRow>>, AppError> {
    let verified = filter.verified.as_deref().and_then(parse_flag);
    let request = PageRequest::new(&page, ADMIN_PAGE_SIZE)?;
    let (count, rows) = list_companies(&state.db, verified, request).await?;
    Ok(Json(Page::new(request, count, rows)?))
}

/// POST /admin/companies
pub async fn handle_create_company(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Json(form): Json<CompanyForm>,
) -> Result<(StatusCode, Json<CompanyRow>), AppError> {
    let name = required_text("name", &form.name, MAX_NAME_LEN)?;
    let code = required_text("code", &form.code, MAX_CODE_LEN)?;
    if find_active_user(&state.db, form.user_id).await?.is_none() {
        return Err(AppError::invalid("user_id", "Unknown user."));
    }

    let company = insert_company(&state.db, name, code, form.user_id, form.verified)
        .await
        .map_err(company_write_error)?;
    info!("Admin created company {}", company.id);
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /admin/companies/:id
pub async fn handle_get_company(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminCompanyRow>, AppError> {
    find_company(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Company", id))
}

/// PATCH /admin/companies/:id
pub async fn handle_update_company(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
    Json(form): Json<CompanyUpdate>,
) -> Result<Json<CompanyRow>, AppError> {
    let name = form
        .name
        .as_deref()
        .map(|n| required_text("name", n, MAX_NAME_LEN))
        .transpose()?;
    let code = form
        .code
        .as_deref()
        .map(|c| required_text("code", c, MAX_CODE_LEN))
        .transpose()?;
    update_company(
        &state.db,
        id,
        CompanyChanges {
            name,
            code,
            verified: form.verified,
            active: form.active,
        },
    )
    .await
    .map_err(company_write_error)?
    .map(Json)
    .ok_or_else(|| AppError::not_found("Company", id))
}

/// DELETE /admin/companies/:id
pub async fn handle_delete_company(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    deleted_or_404(&state, AdminTable::Companies, "Company", id).await
}

/// GET /admin/companies/:id/verify
pub async fn handle_verify_company(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CompanyRow>, AppError> {
    let company = verify_company(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Company", id))?;
    info!("Company '{}' verified by {}", company.name, staff.username);
    Ok(Json(company))
}

// ── Reports ──────────────────────────────────────────────────────────────────

/// GET /admin/recruitment-stats?start=YYYY-MM-DD&end=YYYY-MM-DD
pub async fn handle_recruitment_stats(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Query(query): Query<StatsQuery>,
) -> Result<Json<RecruitmentStats>, AppError> {
    let range = query.range()?;
    Ok(Json(recruitment_stats(&state.db, range).await?))
}
