use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::auth::AuthUser;
use crate::companies::queries::find_company_by_owner;
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::models::user::{UserRole, UserRow};
use crate::permissions::require_self;
use crate::resumes::queries::count_active_resumes;
use crate::state::AppState;
use crate::storage::FormData;
use crate::users::profile::{build_profile, ProfileView};
use crate::users::queries::{insert_user, update_user, username_taken, NewUser, UserChanges};
use crate::users::UserView;

const MAX_PHONE_LEN: usize = 15;

fn parse_role(raw: Option<&str>) -> Result<Option<UserRole>, AppError> {
    raw.map(|r| UserRole::parse(r).ok_or_else(|| AppError::invalid("role", "Unknown role.")))
        .transpose()
}

fn check_phone(phone: Option<&str>) -> Result<(), AppError> {
    match phone {
        Some(p) if p.chars().count() > MAX_PHONE_LEN => Err(AppError::invalid(
            "phone",
            format!("Ensure this field has no more than {MAX_PHONE_LEN} characters."),
        )),
        _ => Ok(()),
    }
}

async fn current_profile(state: &AppState, user: &UserRow) -> Result<ProfileView, AppError> {
    let view = UserView::new(user, &state.storage);
    let (company, resume_count) = if user.is_employer() {
        (find_company_by_owner(&state.db, user.id).await?, 0)
    } else {
        (None, count_active_resumes(&state.db, user.id).await?)
    };
    Ok(build_profile(user, view, company.as_ref(), resume_count))
}

/// POST /api/v1/users (multipart)
pub async fn handle_register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    let mut form = FormData::from_multipart(multipart).await?;

    let username = form.require("username")?.to_string();
    let password = form.require_raw("password")?.to_string();
    let role = parse_role(form.text("role"))?.unwrap_or(UserRole::Seeker);
    let phone = form.text("phone").map(str::to_string);
    check_phone(phone.as_deref())?;

    if username_taken(&state.db, &username).await? {
        return Err(AppError::invalid(
            "username",
            "A user with that username already exists.",
        ));
    }

    let password_hash = hash_password(&password)?;
    let avatar_key = match form.take_file("avatar") {
        Some(file) => Some(state.storage.put("avatars", file).await?),
        None => None,
    };

    let user = insert_user(
        &state.db,
        NewUser {
            username: &username,
            password_hash: &password_hash,
            email: form.text("email").unwrap_or_default(),
            first_name: form.text("first_name").unwrap_or_default(),
            last_name: form.text("last_name").unwrap_or_default(),
            phone: phone.as_deref(),
            role,
            avatar_key: avatar_key.as_deref(),
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::invalid("username", "A user with that username already exists.")
        } else {
            AppError::Database(e)
        }
    })?;

    info!("Registered user {} ({:?})", user.id, user.role);
    Ok((StatusCode::CREATED, Json(UserView::new(&user, &state.storage))))
}

/// GET /api/v1/users/current-user
pub async fn handle_current_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ProfileView>, AppError> {
    Ok(Json(current_profile(&state, &user).await?))
}

/// PATCH /api/v1/users/current-user (multipart: email, phone, role, avatar)
pub async fn handle_update_current_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> Result<Json<ProfileView>, AppError> {
    let mut form = FormData::from_multipart(multipart).await?;
    let role = parse_role(form.text("role"))?;
    check_phone(form.text("phone"))?;

    let avatar_key = match form.take_file("avatar") {
        Some(file) => Some(state.storage.put("avatars", file).await?),
        None => None,
    };

    let updated = update_user(
        &state.db,
        user.id,
        UserChanges {
            email: form.text("email"),
            phone: form.text("phone"),
            role,
            avatar_key: avatar_key.as_deref(),
            ..Default::default()
        },
    )
    .await?;

    Ok(Json(current_profile(&state, &updated).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// PATCH /api/v1/users/:id
pub async fn handle_update_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UserUpdate>,
) -> Result<Json<UserView>, AppError> {
    require_self(&user, id)?;
    check_phone(req.phone.as_deref())?;

    let updated = update_user(
        &state.db,
        id,
        UserChanges {
            email: req.email.as_deref(),
            phone: req.phone.as_deref(),
            first_name: req.first_name.as_deref(),
            last_name: req.last_name.as_deref(),
            ..Default::default()
        },
    )
    .await?;

    Ok(Json(UserView::new(&updated, &state.storage)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;

    #[test]
    fn test_registered_password_logs_in_verbatim() {
        let form = FormData::default().with_text("password", "  s3cret  ");
        let stored = hash_password(form.require_raw("password").unwrap()).unwrap();
        assert!(verify_password("  s3cret  ", &stored));
        assert!(!verify_password("s3cret", &stored));
    }

    #[test]
    fn test_role_defaults_and_errors() {
        assert_eq!(parse_role(None).unwrap(), None);
        assert_eq!(parse_role(Some("1")).unwrap(), Some(UserRole::Employer));
        assert!(matches!(
            parse_role(Some("admin")),
            Err(AppError::Invalid { ref field, .. }) if field == "role"
        ));
    }

    #[test]
    fn test_phone_length_limit() {
        assert!(check_phone(Some("+84901234567")).is_ok());
        assert!(check_phone(Some("0123456789012345")).is_err());
        assert!(check_phone(None).is_ok());
    }
}
