//! Application rows joined with the applicant, resume, posting or company,
//! depending on who is looking.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::apply::{ApplyRow, ApplyStatus};
use crate::resumes::ResumeView;
use crate::storage::Storage;

#[derive(Debug, Clone, Serialize)]
pub struct ApplyView {
    #[serde(flatten)]
    pub apply: ApplyRow,
    pub status_label: &'static str,
}

impl From<ApplyRow> for ApplyView {
    fn from(apply: ApplyRow) -> Self {
        ApplyView {
            status_label: ApplyStatus::from(apply.status).label(),
            apply,
        }
    }
}

fn display_name(first: &str, last: &str) -> String {
    format!("{first} {last}").trim().to_string()
}

/// Applicants to one posting, as seen by the posting company.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    #[sqlx(flatten)]
    pub apply: ApplyRow,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub user_email: String,
    pub user_avatar_key: Option<String>,
    pub resume_name: String,
    pub resume_cv_key: Option<String>,
    pub resume_created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateView {
    #[serde(flatten)]
    pub apply: ApplyView,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub user_avatar: String,
    pub resume_detail: ResumeView,
}

impl CandidateView {
    pub fn new(row: CandidateRow, storage: &Storage) -> Self {
        let resume_detail = ResumeView {
            id: row.apply.resume_id,
            name: row.resume_name,
            cv: storage.url(row.resume_cv_key.as_deref()),
            user_id: row.user_id,
            created_at: row.resume_created_at,
        };
        CandidateView {
            user_id: row.user_id,
            user_name: display_name(&row.first_name, &row.last_name),
            user_email: row.user_email,
            user_avatar: storage.url(row.user_avatar_key.as_deref()),
            resume_detail,
            apply: row.apply.into(),
        }
    }
}

/// Hired applicants of one company.
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeRow {
    #[sqlx(flatten)]
    pub apply: ApplyRow,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub user_avatar_key: Option<String>,
    pub work: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeView {
    #[serde(flatten)]
    pub apply: ApplyView,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: String,
    /// Title of the posting the employee was hired through.
    pub work: String,
}

impl EmployeeView {
    pub fn new(row: EmployeeRow, storage: &Storage) -> Self {
        EmployeeView {
            user_id: row.user_id,
            user_name: display_name(&row.first_name, &row.last_name),
            user_avatar: storage.url(row.user_avatar_key.as_deref()),
            work: row.work,
            apply: row.apply.into(),
        }
    }
}

/// The requester's own applications with the posting and company names.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MyApplyRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub apply: ApplyRow,
    pub work: String,
    pub company_id: Uuid,
    pub company_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(status: i16) -> ApplyRow {
        ApplyRow {
            id: Uuid::new_v4(),
            status,
            resume_id: Uuid::new_v4(),
            recruitment_id: Uuid::new_v4(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_trims_missing_parts() {
        assert_eq!(display_name("Lan", "Nguyen"), "Lan Nguyen");
        assert_eq!(display_name("", "Nguyen"), "Nguyen");
        assert_eq!(display_name("", ""), "");
    }

    #[test]
    fn test_apply_view_is_flat_with_label() {
        let json = serde_json::to_value(ApplyView::from(apply(4))).unwrap();
        assert_eq!(json["status"], 4);
        assert_eq!(json["status_label"], "hired");
        assert!(json.get("apply").is_none());
    }
}
