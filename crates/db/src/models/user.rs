//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use jobbit_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff_member: bool,
    pub is_superuser: bool,
    pub is_2fa_enabled: bool,
    pub type_2fa: String,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Staff members and superusers may moderate accounts.
    pub fn is_staff_or_superuser(&self) -> bool {
        self.is_staff_member || self.is_superuser
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub is_2fa_enabled: bool,
    pub type_2fa: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            is_2fa_enabled: user.is_2fa_enabled,
            type_2fa: user.type_2fa.clone(),
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub is_active: bool,
    pub type_2fa: String,
}
