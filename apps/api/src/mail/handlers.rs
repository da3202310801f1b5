use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::mail::OutgoingMail;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SendMailRequest {
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// POST /api/v1/send-mail
pub async fn handle_send_mail(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<SendMailRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(email), Some(subject), Some(message)) = (
        present(&req.email),
        present(&req.subject),
        present(&req.message),
    ) else {
        return Err(AppError::Validation("Missing required fields".to_string()));
    };

    let mail = OutgoingMail {
        from: state.config.mail_from.clone(),
        to: vec![email.to_string()],
        bcc: vec![],
        reply_to: Some(user.email.clone()).filter(|e| !e.is_empty()),
        subject: subject.to_string(),
        text: message.to_string(),
    };

    state.mailer.send(mail).await?;
    info!("User {} sent mail to {email}", user.id);

    Ok(Json(json!({ "detail": "Email sent successfully" })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::user::UserRole;
    use crate::permissions::fixtures::user;
    use crate::state::testing::{test_state, FailingMailer, RecordingMailer};

    fn request(email: &str, subject: &str, message: &str) -> SendMailRequest {
        SendMailRequest {
            email: Some(email.to_string()),
            subject: Some(subject.to_string()),
            message: Some(message.to_string()),
        }
    }

    #[tokio::test]
    async fn test_sends_with_reply_to_requester() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = test_state(mailer.clone());
        let sender = user(UserRole::Employer);

        let Json(body) = handle_send_mail(
            State(state),
            AuthUser(sender.clone()),
            Json(request("cand@example.com", "Interview", "See you Monday")),
        )
        .await
        .unwrap();

        assert_eq!(body["detail"], "Email sent successfully");
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent[0].to, vec!["cand@example.com".to_string()]);
        assert_eq!(sent[0].reply_to.as_deref(), Some(sender.email.as_str()));
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let state = test_state(Arc::new(RecordingMailer::default()));
        let result = handle_send_mail(
            State(state),
            AuthUser(user(UserRole::Seeker)),
            Json(request("cand@example.com", "", "hello")),
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(ref m)) if m == "Missing required fields"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported() {
        let state = test_state(Arc::new(FailingMailer));
        let result = handle_send_mail(
            State(state),
            AuthUser(user(UserRole::Seeker)),
            Json(request("cand@example.com", "Hi", "hello")),
        )
        .await;

        assert!(matches!(result, Err(AppError::Mail(ref m)) if m.contains("transport down")));
    }
}
