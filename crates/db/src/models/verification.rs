//! Identity verification requests submitted by profile owners.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use jobbit_core::types::{DbId, Timestamp};

/// A row from `client_verifications` or `executor_verifications`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Verification {
    pub id: DbId,
    pub profile_id: DbId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub birthday: NaiveDate,
    pub address: String,
    pub passport_photo_url: String,
    pub selfie_with_passport_url: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateVerification {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub birthday: NaiveDate,
    pub address: String,
    pub passport_photo_url: String,
    pub selfie_with_passport_url: String,
}
