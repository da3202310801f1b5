use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account role. Stored as SMALLINT: 0 = job seeker, 1 = employer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Seeker = 0,
    Employer = 1,
}

impl UserRole {
    /// Accepts either the numeric code or the name.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "0" | "seeker" | "default" => Some(UserRole::Seeker),
            "1" | "employer" => Some(UserRole::Employer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub avatar_key: Option<String>,
    pub is_staff: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn is_employer(&self) -> bool {
        self.role == UserRole::Employer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_numeric_and_named() {
        assert_eq!(UserRole::parse("0"), Some(UserRole::Seeker));
        assert_eq!(UserRole::parse("1"), Some(UserRole::Employer));
        assert_eq!(UserRole::parse("Employer"), Some(UserRole::Employer));
        assert_eq!(UserRole::parse("seeker"), Some(UserRole::Seeker));
        assert_eq!(UserRole::parse("2"), None);
    }

    #[test]
    fn test_role_serializes_as_name() {
        assert_eq!(serde_json::to_string(&UserRole::Employer).unwrap(), "\"employer\"");
    }
}
