pub mod handlers;
pub mod queries;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::resume::ResumeRow;
use crate::storage::Storage;

pub const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, Serialize)]
pub struct ResumeView {
    pub id: Uuid,
    pub name: String,
    /// Resolved CV URL, `""` when no document was uploaded.
    pub cv: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ResumeView {
    pub fn new(resume: ResumeRow, storage: &Storage) -> Self {
        ResumeView {
            cv: storage.url(resume.cv_key.as_deref()),
            id: resume.id,
            name: resume.name,
            user_id: resume.user_id,
            created_at: resume.created_at,
        }
    }
}
