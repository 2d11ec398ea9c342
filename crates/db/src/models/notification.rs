//! In-app notification model and DTO.

use serde::Serialize;
use sqlx::FromRow;
use jobbit_core::types::{DbId, Timestamp};

/// Icon used when a notification is raised without one.
pub const DEFAULT_ICON: &str = "https://png.pngtree.com/png-vector/20190505/ourmid/pngtree-vector-notification-icon-png-image_1022639.jpg";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub content: Option<String>,
    pub icon: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
}

/// DTO for an internally raised notification. `icon` falls back to [`DEFAULT_ICON`].
#[derive(Debug)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub title: String,
    pub content: Option<String>,
    pub icon: Option<String>,
}
