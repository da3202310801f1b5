use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplyRow {
    pub id: Uuid,
    pub status: i16,
    pub resume_id: Uuid,
    pub recruitment_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application status. The column is a free SMALLINT, so codes outside the
/// named set are kept as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStatus {
    Pending,
    Accepted,
    Rejected,
    /// Candidate was taken on by the company.
    Hired,
    Other(i16),
}

impl ApplyStatus {
    pub const HIRED_CODE: i16 = 4;

    pub fn code(self) -> i16 {
        match self {
            ApplyStatus::Pending => 0,
            ApplyStatus::Accepted => 1,
            ApplyStatus::Rejected => 2,
            ApplyStatus::Hired => Self::HIRED_CODE,
            ApplyStatus::Other(code) => code,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ApplyStatus::Pending => "pending",
            ApplyStatus::Accepted => "accepted",
            ApplyStatus::Rejected => "rejected",
            ApplyStatus::Hired => "hired",
            ApplyStatus::Other(_) => "custom",
        }
    }
}

impl From<i16> for ApplyStatus {
    fn from(code: i16) -> Self {
        match code {
            0 => ApplyStatus::Pending,
            1 => ApplyStatus::Accepted,
            2 => ApplyStatus::Rejected,
            Self::HIRED_CODE => ApplyStatus::Hired,
            other => ApplyStatus::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_map_to_named_states() {
        assert_eq!(ApplyStatus::from(0), ApplyStatus::Pending);
        assert_eq!(ApplyStatus::from(2), ApplyStatus::Rejected);
        assert_eq!(ApplyStatus::from(4), ApplyStatus::Hired);
    }

    #[test]
    fn test_custom_codes_are_preserved() {
        let status = ApplyStatus::from(7);
        assert_eq!(status, ApplyStatus::Other(7));
        assert_eq!(status.code(), 7);
        assert_eq!(status.label(), "custom");
    }
}
