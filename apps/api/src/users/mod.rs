pub mod handlers;
pub mod profile;
pub mod queries;

use serde::Serialize;
use uuid::Uuid;

use crate::models::user::{UserRole, UserRow};
use crate::storage::Storage;

/// Public shape of a user; the avatar key is resolved to a URL.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub avatar: String,
}

impl UserView {
    pub fn new(user: &UserRow, storage: &Storage) -> Self {
        UserView {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            avatar: storage.url(user.avatar_key.as_deref()),
        }
    }
}
