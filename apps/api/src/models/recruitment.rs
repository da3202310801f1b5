use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A job posting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecruitmentRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub skills_required: String,
    pub salary: Decimal,
    pub work_time_start: DateTime<Utc>,
    pub location: String,
    pub category_id: Uuid,
    pub work_type_id: Option<Uuid>,
    pub company_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
