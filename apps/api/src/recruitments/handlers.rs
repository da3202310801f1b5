use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::companies::queries::find_active_company;
use crate::errors::AppError;
use crate::mail::notify::notify_followers;
use crate::models::recruitment::RecruitmentRow;
use crate::models::user::UserRow;
use crate::pagination::{Page, PageQuery, PageRequest, RECRUITMENT_PAGE_SIZE};
use crate::permissions::{require_postable_company, require_recruitment_owner};
use crate::recruitments::filter::RecruitmentQuery;
use crate::recruitments::queries::{
    category_is_active, find_active_recruitment, has_applied, insert_recruitment,
    list_recruitments, recruitment_owner, set_recruitment_active, update_recruitment,
    work_type_is_active, NewRecruitment, RecruitmentChanges,
};
use crate::state::AppState;

const MAX_TEXT_LEN: usize = 255;

/// NUMERIC(10, 2) holds at most eight integer digits.
fn salary_limit() -> Decimal {
    Decimal::new(100_000_000, 0)
}

#[derive(Debug, Deserialize)]
pub struct CreateRecruitment {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub skills_required: String,
    pub salary: Decimal,
    pub work_time_start: DateTime<Utc>,
    pub location: String,
    pub category_id: Uuid,
    #[serde(default)]
    pub work_type_id: Option<Uuid>,
    pub company_id: Uuid,
}

/// Keeps an explicit JSON `null` apart from an absent key: absent is `None`,
/// `null` is `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecruitment {
    pub title: Option<String>,
    pub description: Option<String>,
    pub skills_required: Option<String>,
    pub salary: Option<Decimal>,
    pub work_time_start: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category_id: Option<Uuid>,
    /// `null` clears the work type.
    #[serde(default, deserialize_with = "present")]
    pub work_type_id: Option<Option<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct ActiveToggle {
    pub active: bool,
}

fn check_text(field: &str, value: &str, required: bool) -> Result<(), AppError> {
    if required && value.trim().is_empty() {
        return Err(AppError::invalid(field, "This field may not be blank."));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::invalid(
            field,
            format!("Ensure this field has no more than {MAX_TEXT_LEN} characters."),
        ));
    }
    Ok(())
}

fn check_salary(salary: Decimal) -> Result<(), AppError> {
    if salary.is_sign_negative() {
        return Err(AppError::invalid("salary", "Salary cannot be negative."));
    }
    if salary >= salary_limit() || salary.round_dp(2) != salary {
        return Err(AppError::invalid(
            "salary",
            "Ensure there are no more than 10 digits in total and 2 decimal places.",
        ));
    }
    Ok(())
}

impl CreateRecruitment {
    fn validate(&self) -> Result<(), AppError> {
        check_text("title", &self.title, true)?;
        check_text("location", &self.location, true)?;
        check_text("skills_required", &self.skills_required, false)?;
        if self.description.trim().is_empty() {
            return Err(AppError::invalid("description", "This field may not be blank."));
        }
        check_salary(self.salary)
    }
}

impl UpdateRecruitment {
    fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            check_text("title", title, true)?;
        }
        if let Some(location) = &self.location {
            check_text("location", location, true)?;
        }
        if let Some(skills) = &self.skills_required {
            check_text("skills_required", skills, false)?;
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(AppError::invalid("description", "This field may not be blank."));
            }
        }
        if let Some(salary) = self.salary {
            check_salary(salary)?;
        }
        Ok(())
    }
}

async fn check_references(
    pool: &PgPool,
    category_id: Option<Uuid>,
    work_type_id: Option<Uuid>,
) -> Result<(), AppError> {
    if let Some(id) = category_id {
        if !category_is_active(pool, id).await? {
            return Err(AppError::invalid("category_id", "Unknown category."));
        }
    }
    if let Some(id) = work_type_id {
        if !work_type_is_active(pool, id).await? {
            return Err(AppError::invalid("work_type_id", "Unknown work type."));
        }
    }
    Ok(())
}

async fn require_owner_of(pool: &PgPool, user: &UserRow, id: Uuid) -> Result<(), AppError> {
    let owner = recruitment_owner(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Recruitment", id))?;
    require_recruitment_owner(user, owner)
}

/// GET /api/v1/recruitments
pub async fn handle_list_recruitments(
    State(state): State<AppState>,
    Query(filters): Query<RecruitmentQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<RecruitmentRow>>, AppError> {
    let criteria = filters.criteria()?;
    let request = PageRequest::new(&page, RECRUITMENT_PAGE_SIZE)?;
    let (count, rows) = list_recruitments(&state.db, &criteria, request).await?;
    Ok(Json(Page::new(request, count, rows)?))
}

/// POST /api/v1/recruitments
pub async fn handle_create_recruitment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateRecruitment>,
) -> Result<(StatusCode, Json<RecruitmentRow>), AppError> {
    req.validate()?;

    let company = find_active_company(&state.db, req.company_id).await?;
    let company = require_postable_company(&user, company.as_ref())?;
    check_references(&state.db, Some(req.category_id), req.work_type_id).await?;

    let recruitment = insert_recruitment(
        &state.db,
        NewRecruitment {
            title: req.title.trim(),
            description: &req.description,
            skills_required: req.skills_required.trim(),
            salary: req.salary,
            work_time_start: req.work_time_start,
            location: req.location.trim(),
            category_id: req.category_id,
            work_type_id: req.work_type_id,
            company_id: company.id,
        },
    )
    .await?;
    info!(
        "Company {} published recruitment {}",
        company.id, recruitment.id
    );

    notify_followers(
        &state.db,
        state.mailer.as_ref(),
        &state.config.mail_from,
        company,
        &user,
    )
    .await;

    Ok((StatusCode::CREATED, Json(recruitment)))
}

/// GET /api/v1/recruitments/:id
pub async fn handle_get_recruitment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecruitmentRow>, AppError> {
    let recruitment = find_active_recruitment(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Recruitment", id))?;
    Ok(Json(recruitment))
}

/// PATCH|PUT /api/v1/recruitments/:id
pub async fn handle_update_recruitment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRecruitment>,
) -> Result<Json<RecruitmentRow>, AppError> {
    require_owner_of(&state.db, &user, id).await?;
    req.validate()?;
    check_references(&state.db, req.category_id, req.work_type_id.flatten()).await?;

    let updated = update_recruitment(
        &state.db,
        id,
        RecruitmentChanges {
            title: req.title.as_deref().map(str::trim),
            description: req.description.as_deref(),
            skills_required: req.skills_required.as_deref().map(str::trim),
            salary: req.salary,
            work_time_start: req.work_time_start,
            location: req.location.as_deref().map(str::trim),
            category_id: req.category_id,
            work_type_id: req.work_type_id,
        },
    )
    .await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/recruitments/:id (soft delete)
pub async fn handle_delete_recruitment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_owner_of(&state.db, &user, id).await?;
    set_recruitment_active(&state.db, id, false).await?;
    info!("Recruitment {id} deactivated by user {}", user.id);
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/recruitments/:id/change
pub async fn handle_change_active(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ActiveToggle>,
) -> Result<Json<RecruitmentRow>, AppError> {
    require_owner_of(&state.db, &user, id).await?;
    Ok(Json(set_recruitment_active(&state.db, id, req.active).await?))
}

/// GET /api/v1/recruitments/:id/applied
pub async fn handle_applied(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let applied = has_applied(&state.db, user.id, id).await?;
    Ok(Json(json!({ "applied": applied })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::Arc;

    use crate::models::user::UserRole;
    use crate::state::testing::{
        db_state, seed_category, seed_company, seed_user, test_db, RecordingMailer,
    };

    fn posting() -> CreateRecruitment {
        CreateRecruitment {
            title: "Rust backend engineer".to_string(),
            description: "Build the job board".to_string(),
            skills_required: "rust, sql".to_string(),
            salary: Decimal::from_str("2500.50").unwrap(),
            work_time_start: Utc::now(),
            location: "Ho Chi Minh City".to_string(),
            category_id: Uuid::new_v4(),
            work_type_id: None,
            company_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_valid_posting_passes() {
        assert!(posting().validate().is_ok());
    }

    #[test]
    fn test_blank_title_is_field_error() {
        let mut req = posting();
        req.title = "  ".to_string();
        assert!(matches!(
            req.validate(),
            Err(AppError::Invalid { ref field, .. }) if field == "title"
        ));
    }

    #[test]
    fn test_salary_bounds() {
        assert!(check_salary(Decimal::ZERO).is_ok());
        assert!(check_salary(Decimal::from_str("99999999.99").unwrap()).is_ok());
        assert!(check_salary(Decimal::from_str("100000000").unwrap()).is_err());
        assert!(check_salary(Decimal::from_str("-1").unwrap()).is_err());
        assert!(check_salary(Decimal::from_str("10.123").unwrap()).is_err());
    }

    #[test]
    fn test_salary_accepts_string_or_number_in_json() {
        let body = serde_json::json!({
            "title": "t", "description": "d", "salary": "1200.00",
            "work_time_start": "2025-06-01T08:00:00Z", "location": "Hanoi",
            "category_id": Uuid::new_v4(), "company_id": Uuid::new_v4()
        });
        let req: CreateRecruitment = serde_json::from_value(body).unwrap();
        assert_eq!(req.salary, Decimal::from_str("1200").unwrap());
        assert_eq!(req.work_type_id, None);
        assert_eq!(req.skills_required, "");
    }

    #[test]
    fn test_work_type_update_distinguishes_null_from_absent() {
        let absent: UpdateRecruitment = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert_eq!(absent.work_type_id, None);

        let cleared: UpdateRecruitment =
            serde_json::from_str(r#"{"work_type_id":null}"#).unwrap();
        assert_eq!(cleared.work_type_id, Some(None));

        let id = Uuid::new_v4();
        let set: UpdateRecruitment =
            serde_json::from_value(serde_json::json!({ "work_type_id": id })).unwrap();
        assert_eq!(set.work_type_id, Some(Some(id)));
    }

    #[test]
    fn test_partial_update_only_checks_present_fields() {
        assert!(UpdateRecruitment::default().validate().is_ok());
        let bad = UpdateRecruitment {
            location: Some(String::new()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[tokio::test]
    async fn test_only_verified_company_can_publish() {
        let Some(pool) = test_db().await else { return };
        let state = db_state(pool.clone(), Arc::new(RecordingMailer::default()));
        let category = seed_category(&pool).await;
        let owner = seed_user(&pool, UserRole::Employer).await;
        let company = seed_company(&pool, &owner, false).await;
        let request = || CreateRecruitment {
            category_id: category.id,
            company_id: company.id,
            ..posting()
        };

        let refused =
            handle_create_recruitment(State(state.clone()), AuthUser(owner.clone()), Json(request()))
                .await;
        assert!(matches!(refused, Err(AppError::Forbidden)));

        sqlx::query("UPDATE companies SET verified = TRUE WHERE id = $1")
            .bind(company.id)
            .execute(&pool)
            .await
            .unwrap();
        let (status, Json(created)) =
            handle_create_recruitment(State(state), AuthUser(owner), Json(request()))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.company_id, company.id);
    }
}
