use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::companies::queries::find_active_company;
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::follows::queries::{
    delete_follow, find_follow, followed_companies, insert_follow, is_following,
    list_user_follows,
};
use crate::models::company::CompanyRow;
use crate::models::interaction::FollowRow;
use crate::permissions::require_owner;
use crate::state::AppState;

const ALREADY_FOLLOWING: &str = "You are already following this company.";

#[derive(Debug, Deserialize)]
pub struct CreateFollow {
    pub company_id: Uuid,
}

/// GET /api/v1/follows
pub async fn handle_list_follows(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<FollowRow>>, AppError> {
    Ok(Json(list_user_follows(&state.db, user.id).await?))
}

/// POST /api/v1/follows
pub async fn handle_create_follow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateFollow>,
) -> Result<(StatusCode, Json<FollowRow>), AppError> {
    if find_active_company(&state.db, req.company_id).await?.is_none() {
        return Err(AppError::invalid("company_id", "Unknown company."));
    }
    if is_following(&state.db, user.id, req.company_id).await? {
        return Err(AppError::invalid("company_id", ALREADY_FOLLOWING));
    }

    let follow = insert_follow(&state.db, user.id, req.company_id)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::invalid("company_id", ALREADY_FOLLOWING)
            } else {
                AppError::Database(e)
            }
        })?;
    info!("User {} followed company {}", user.id, follow.company_id);
    Ok((StatusCode::CREATED, Json(follow)))
}

/// DELETE /api/v1/follows/:id
pub async fn handle_delete_follow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let follow = find_follow(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Follow", id))?;
    require_owner(&user, follow.user_id)?;
    delete_follow(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/follows/companies
pub async fn handle_followed_companies(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<CompanyRow>>, AppError> {
    Ok(Json(followed_companies(&state.db, user.id).await?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::user::UserRole;
    use crate::state::testing::{db_state, seed_company, seed_user, test_db, RecordingMailer};

    #[test]
    fn test_follow_body_needs_company() {
        assert!(serde_json::from_str::<CreateFollow>("{}").is_err());
        let body: CreateFollow =
            serde_json::from_str(r#"{"company_id":"6c1f0d3e-4b7a-4c55-9d1e-2f3a4b5c6d7e"}"#)
                .unwrap();
        assert_eq!(
            body.company_id.to_string(),
            "6c1f0d3e-4b7a-4c55-9d1e-2f3a4b5c6d7e"
        );
    }

    #[tokio::test]
    async fn test_second_follow_is_rejected_until_unfollowed() {
        let Some(pool) = test_db().await else { return };
        let state = db_state(pool.clone(), Arc::new(RecordingMailer::default()));
        let me = seed_user(&pool, UserRole::Seeker).await;
        let company = seed_company(&pool, &seed_user(&pool, UserRole::Employer).await, true).await;
        let follow = || CreateFollow {
            company_id: company.id,
        };

        let (status, Json(first)) =
            handle_create_follow(State(state.clone()), AuthUser(me.clone()), Json(follow()))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let again =
            handle_create_follow(State(state.clone()), AuthUser(me.clone()), Json(follow())).await;
        assert!(matches!(
            again,
            Err(AppError::Invalid { ref field, .. }) if field == "company_id"
        ));

        let status = handle_delete_follow(State(state.clone()), AuthUser(me.clone()), Path(first.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = handle_create_follow(State(state), AuthUser(me), Json(follow()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
    }
}
