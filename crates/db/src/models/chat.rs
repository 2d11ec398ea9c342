//! Chat participants, chats, messages and attached files.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use jobbit_core::types::{DbId, Timestamp};

/// A user acting in one role inside chats. Unique per (user, role).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Participant {
    pub id: DbId,
    pub user_id: DbId,
    pub role: String,
}

/// A row from the `chats` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Chat {
    pub id: DbId,
    pub title: String,
    pub cover: String,
    pub associated_order_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Data for a new chat and its initial members.
#[derive(Debug)]
pub struct CreateChat<'a> {
    pub title: &'a str,
    pub cover: &'a str,
    pub associated_order_id: Option<DbId>,
    pub participant_ids: &'a [DbId],
}

/// A row from the `chat_messages` table. Files are loaded separately.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub chat_id: DbId,
    pub author_id: Option<DbId>,
    pub text: Option<String>,
    pub audio: Option<String>,
    pub status: String,
    pub answer_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for a new message. `files_url` lists already uploaded file URLs.
#[derive(Debug, Deserialize)]
pub struct CreateMessage {
    pub text: Option<String>,
    pub audio: Option<String>,
    pub answer: Option<DbId>,
    #[serde(default)]
    pub files_url: Vec<String>,
}

/// DTO for patching a message. `files_url`, when present, replaces the file set.
#[derive(Debug, Deserialize)]
pub struct UpdateMessage {
    pub text: Option<String>,
    pub audio: Option<String>,
    pub answer: Option<DbId>,
    pub files_url: Option<Vec<String>>,
}

/// A file referenced by one or more messages.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatFile {
    pub id: DbId,
    pub file_url: String,
    pub name: String,
    pub size: Option<i64>,
    pub media_type: Option<String>,
}

/// Metadata recorded when a file URL is first attached.
#[derive(Debug, Clone, Default)]
pub struct CreateChatFile {
    pub file_url: String,
    pub name: String,
    pub size: Option<i64>,
    pub media_type: Option<String>,
}

/// A [`ChatFile`] together with the message it is attached to.
#[derive(Debug, Clone, FromRow)]
pub struct MessageFile {
    pub message_id: DbId,
    #[sqlx(flatten)]
    pub file: ChatFile,
}
