use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::companies::queries::{
    code_taken, company_images, find_active_company, find_company_by_owner,
    insert_company_with_images, list_active_companies, owns_any_company,
};
use crate::companies::{CompanyView, MAX_CODE_LEN, MAX_NAME_LEN};
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::models::company::CompanyRow;
use crate::pagination::{Page, PageQuery, PageRequest, COMPANY_PAGE_SIZE};
use crate::permissions::require_employer;
use crate::state::AppState;
use crate::storage::FormData;

pub(crate) fn check_length(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::invalid(
            field,
            format!("Ensure this field has no more than {max} characters."),
        ));
    }
    Ok(())
}

const DUPLICATE_CODE: &str = "company with this code already exists.";
const ALREADY_OWNS: &str = "You already own a company";

/// Field blamed for a unique violation on `companies`, from the constraint
/// name (`companies_code_key` or `companies_user_id_key`).
fn conflict_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(name) if name.contains("user_id") => "user_id",
        _ => "code",
    }
}

/// Maps an insert/update failure on `companies` to a client error.
pub(crate) fn company_write_error(err: sqlx::Error) -> AppError {
    if !is_unique_violation(&err) {
        return AppError::Database(err);
    }
    let constraint = err.as_database_error().and_then(|d| d.constraint());
    match conflict_field(constraint) {
        "user_id" => AppError::invalid("user_id", "This user already owns a company."),
        _ => AppError::invalid("code", DUPLICATE_CODE),
    }
}

async fn company_view(state: &AppState, company: CompanyRow) -> Result<CompanyView, AppError> {
    let images = company_images(&state.db, company.id).await?;
    Ok(CompanyView::new(company, &images, &state.storage))
}

/// GET /api/v1/companies
pub async fn handle_list_companies(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<CompanyRow>>, AppError> {
    let request = PageRequest::new(&page, COMPANY_PAGE_SIZE)?;
    let (count, rows) = list_active_companies(&state.db, request).await?;
    Ok(Json(Page::new(request, count, rows)?))
}

/// POST /api/v1/companies (multipart: name, code, images[])
pub async fn handle_create_company(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CompanyView>), AppError> {
    require_employer(&user)?;
    let mut form = FormData::from_multipart(multipart).await?;

    let name = form.require("name")?.to_string();
    let code = form.require("code")?.to_string();
    check_length("name", &name, MAX_NAME_LEN)?;
    check_length("code", &code, MAX_CODE_LEN)?;

    if owns_any_company(&state.db, user.id).await? {
        return Err(AppError::Conflict(ALREADY_OWNS.to_string()));
    }
    if code_taken(&state.db, &code).await? {
        return Err(AppError::invalid("code", DUPLICATE_CODE));
    }

    let mut image_keys = Vec::new();
    for file in form.take_files("images") {
        image_keys.push(state.storage.put("companies", file).await?);
    }

    let (company, images) =
        match insert_company_with_images(&state.db, user.id, &name, &code, &image_keys).await {
            Ok(created) => created,
            Err(e) => {
                state.storage.discard(&image_keys).await;
                return Err(company_write_error(e));
            }
        };

    Ok((
        StatusCode::CREATED,
        Json(CompanyView::new(company, &images, &state.storage)),
    ))
}

/// GET /api/v1/companies/owner
pub async fn handle_owner_company(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<CompanyView>, AppError> {
    let company = find_company_by_owner(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("You do not own a company".to_string()))?;
    Ok(Json(company_view(&state, company).await?))
}

/// GET /api/v1/companies/:id
pub async fn handle_get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompanyView>, AppError> {
    let company = find_active_company(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Company", id))?;
    Ok(Json(company_view(&state, company).await?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::user::UserRole;
    use crate::state::testing::{
        db_state, seed_company, seed_user, test_db, text_multipart, unique_tag, RecordingMailer,
    };

    #[test]
    fn test_unique_violation_blames_the_right_field() {
        assert_eq!(conflict_field(Some("companies_user_id_key")), "user_id");
        assert_eq!(conflict_field(Some("companies_code_key")), "code");
        assert_eq!(conflict_field(None), "code");
    }

    #[test]
    fn test_length_is_counted_in_chars() {
        assert!(check_length("code", "CÔNGTY", 6).is_ok());
        assert!(matches!(
            check_length("code", "ABCDEFGHIJKLMNOPQRSTU", MAX_CODE_LEN),
            Err(AppError::Invalid { ref field, .. }) if field == "code"
        ));
    }

    #[tokio::test]
    async fn test_soft_deleted_company_still_blocks_a_second_one() {
        let Some(pool) = test_db().await else { return };
        let state = db_state(pool.clone(), Arc::new(RecordingMailer::default()));
        let owner = seed_user(&pool, UserRole::Employer).await;
        let old = seed_company(&pool, &owner, true).await;
        sqlx::query("UPDATE companies SET active = FALSE WHERE id = $1")
            .bind(old.id)
            .execute(&pool)
            .await
            .unwrap();

        let code = format!("N{}", unique_tag());
        let result = handle_create_company(
            State(state),
            AuthUser(owner),
            text_multipart(&[("name", "Second try"), ("code", &code)]).await,
        )
        .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_taken_code_is_a_code_error() {
        let Some(pool) = test_db().await else { return };
        let state = db_state(pool.clone(), Arc::new(RecordingMailer::default()));
        let taken = seed_company(&pool, &seed_user(&pool, UserRole::Employer).await, false).await;

        let result = handle_create_company(
            State(state),
            AuthUser(seed_user(&pool, UserRole::Employer).await),
            text_multipart(&[("name", "Copycat"), ("code", &taken.code)]).await,
        )
        .await;
        assert!(matches!(
            result,
            Err(AppError::Invalid { ref field, .. }) if field == "code"
        ));
    }
}
