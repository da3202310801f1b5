use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::extract::bearer_token;
use crate::auth::password::verify_password;
use crate::auth::{session, AuthUser};
use crate::errors::AppError;
use crate::state::AppState;
use crate::users::queries::find_active_user_by_username;

#[derive(Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user_id: Uuid,
}

/// POST /api/v1/auth/token
pub async fn handle_issue_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = find_active_user_by_username(&state.db, req.username.trim()).await?;
    let user = user
        .filter(|u| verify_password(&req.password, &u.password_hash))
        .ok_or_else(|| {
            AppError::Validation("Unable to log in with provided credentials".to_string())
        })?;

    let token = session::new_token();
    let ttl = state.config.session_ttl_secs;
    session::store(&state.redis, &token, user.id, ttl).await?;
    info!("Issued session token for user {}", user.id);

    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer",
        expires_in: ttl,
        user_id: user.id,
    }))
}

/// DELETE /api/v1/auth/token
pub async fn handle_revoke_token(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    if let Some(token) = bearer_token(&headers) {
        session::revoke(&state.redis, token).await?;
        info!("Revoked session token for user {}", user.id);
    }
    Ok(StatusCode::NO_CONTENT)
}
