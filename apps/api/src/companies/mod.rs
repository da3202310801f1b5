pub mod handlers;
pub mod queries;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::company::{CompanyImageRow, CompanyRow};
use crate::storage::Storage;

pub const MAX_CODE_LEN: usize = 20;
pub const MAX_NAME_LEN: usize = 255;

/// Company with its image URLs resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyView {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub verified: bool,
    pub user_id: Uuid,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl CompanyView {
    pub fn new(company: CompanyRow, images: &[CompanyImageRow], storage: &Storage) -> Self {
        CompanyView {
            id: company.id,
            name: company.name,
            code: company.code,
            verified: company.verified,
            user_id: company.user_id,
            images: images
                .iter()
                .map(|img| storage.url(img.image_key.as_deref()))
                .collect(),
            created_at: company.created_at,
        }
    }
}
