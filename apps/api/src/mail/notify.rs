use sqlx::PgPool;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::mail::{Mailer, OutgoingMail};
use crate::models::company::CompanyRow;
use crate::models::user::UserRow;

const NEW_POSTING_SUBJECT: &str = "News from a company you follow";

/// Trims, drops blanks and removes duplicates while keeping the first
/// occurrence order.
pub fn follower_recipients(emails: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for email in emails {
        let email = email.trim();
        if email.is_empty() || out.iter().any(|e| e.eq_ignore_ascii_case(email)) {
            continue;
        }
        out.push(email.to_string());
    }
    out
}

pub fn new_posting_mail(
    from: &str,
    company_name: &str,
    reply_to: Option<&str>,
    recipients: Vec<String>,
) -> OutgoingMail {
    OutgoingMail {
        from: from.to_string(),
        to: vec![from.to_string()],
        bcc: recipients,
        reply_to: reply_to
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string),
        subject: NEW_POSTING_SUBJECT.to_string(),
        text: format!("{company_name} just published a new job posting, take a look!"),
    }
}

async fn follower_emails(pool: &PgPool, company: &CompanyRow) -> Result<Vec<String>, AppError> {
    Ok(sqlx::query_scalar::<_, String>(
        r#"
        SELECT u.email
        FROM follows f
        JOIN users u ON u.id = f.user_id
        WHERE f.company_id = $1 AND f.active AND u.active
        ORDER BY f.created_at
        "#,
    )
    .bind(company.id)
    .fetch_all(pool)
    .await?)
}

/// Sends the new-posting notice. Delivery failures are logged and reported
/// as `false`; they never fail the posting itself.
pub async fn send_posting_notice(
    mailer: &dyn Mailer,
    from: &str,
    company: &CompanyRow,
    poster: &UserRow,
    recipients: Vec<String>,
) -> bool {
    if recipients.is_empty() {
        return true;
    }
    let count = recipients.len();
    let mail = new_posting_mail(from, &company.name, Some(&poster.email), recipients);
    match mailer.send(mail).await {
        Ok(()) => {
            info!("Notified {count} follower(s) of company {}", company.id);
            true
        }
        Err(e) => {
            warn!("Follower notification for company {} failed: {e}", company.id);
            false
        }
    }
}

pub async fn notify_followers(
    pool: &PgPool,
    mailer: &dyn Mailer,
    from: &str,
    company: &CompanyRow,
    poster: &UserRow,
) -> bool {
    let recipients = match follower_emails(pool, company).await {
        Ok(emails) => follower_recipients(emails),
        Err(e) => {
            warn!("Could not load followers of company {}: {e}", company.id);
            return false;
        }
    };
    send_posting_notice(mailer, from, company, poster, recipients).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::user::UserRole;
    use crate::permissions::fixtures::{company, user};
    use crate::state::testing::{FailingMailer, RecordingMailer};

    #[test]
    fn test_recipients_skip_blank_and_duplicates() {
        let emails = vec![
            "a@example.com".to_string(),
            "".to_string(),
            "  ".to_string(),
            "A@example.com".to_string(),
            " b@example.com ".to_string(),
        ];
        assert_eq!(
            follower_recipients(emails),
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
    }

    #[test]
    fn test_mail_hides_recipients_in_bcc() {
        let mail = new_posting_mail(
            "noreply@jobboard.test",
            "Acme",
            Some("boss@acme.test"),
            vec!["a@example.com".to_string()],
        );
        assert_eq!(mail.to, vec!["noreply@jobboard.test".to_string()]);
        assert_eq!(mail.bcc, vec!["a@example.com".to_string()]);
        assert_eq!(mail.reply_to.as_deref(), Some("boss@acme.test"));
        assert!(mail.text.contains("Acme"));
    }

    #[tokio::test]
    async fn test_notice_is_sent_once_to_all_followers() {
        let mailer = Arc::new(RecordingMailer::default());
        let poster = user(UserRole::Employer);
        let acme = company(poster.id, true);

        let ok = send_posting_notice(
            mailer.as_ref(),
            "noreply@jobboard.test",
            &acme,
            &poster,
            vec!["a@example.com".to_string(), "b@example.com".to_string()],
        )
        .await;

        assert!(ok);
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].bcc.len(), 2);
    }

    #[tokio::test]
    async fn test_no_followers_sends_nothing() {
        let mailer = RecordingMailer::default();
        let poster = user(UserRole::Employer);
        let acme = company(poster.id, true);

        assert!(send_posting_notice(&mailer, "noreply@jobboard.test", &acme, &poster, vec![]).await);
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_swallowed() {
        let poster = user(UserRole::Employer);
        let acme = company(poster.id, true);

        let ok = send_posting_notice(
            &FailingMailer,
            "noreply@jobboard.test",
            &acme,
            &poster,
            vec!["a@example.com".to_string()],
        )
        .await;
        assert!(!ok);
    }
}
