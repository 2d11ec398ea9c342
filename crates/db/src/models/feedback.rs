//! Feedback left by one side of the marketplace about the other.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use jobbit_core::types::{DbId, Timestamp};

/// A row from `client_feedbacks` or `executor_feedbacks`.
///
/// `author_id` is a profile of the opposite kind to `profile_id`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Feedback {
    pub id: DbId,
    pub author_id: DbId,
    pub profile_id: DbId,
    pub text: String,
    pub answer: Option<String>,
    pub rate: i16,
    pub created_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateFeedback {
    pub text: String,
    pub rate: i16,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFeedback {
    pub text: Option<String>,
    pub rate: Option<i16>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerFeedback {
    pub answer: String,
}
