//! Login session model and DTO.

use serde::Serialize;
use sqlx::FromRow;
use jobbit_core::types::{DbId, Timestamp};

/// A row from the `user_sessions` table.
///
/// `session_key` binds the row to one access token; `refresh_token_hash`
/// lets the session be rebound when the access token is refreshed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub session_key: String,
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub last_updated_at: Timestamp,
}

/// DTO for recording a new session.
#[derive(Debug)]
pub struct CreateSession {
    pub user_id: DbId,
    pub session_key: String,
    pub refresh_token_hash: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub expires_at: Timestamp,
}
