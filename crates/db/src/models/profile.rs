//! Client and executor profile models and DTOs.
//!
//! Both profile kinds share one row shape; executor rows additionally carry a
//! `balance`, which is `None` for clients.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use jobbit_core::types::DbId;

/// A row from `client_profiles` or `executor_profiles`, with the derived rating.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: DbId,
    pub user_id: DbId,
    pub email: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub is_active: bool,
    pub is_verified: bool,
    pub gender: Option<String>,
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    pub created_date: NaiveDate,
    /// Average received feedback rate rounded to one decimal, `None` without feedback.
    pub rating: Option<f64>,
}

/// DTO for creating a profile. The owning user comes from the caller.
#[derive(Debug, Default, Deserialize)]
pub struct CreateProfile {
    pub email: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<String>,
    pub avatar: Option<String>,
}

/// DTO for patching a profile. All fields optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    pub email: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<String>,
    pub avatar: Option<String>,
    pub is_active: Option<bool>,
}

/// Query-string filters for the executor listing.
///
/// Name filters accept a comma-separated list and match any of its entries.
#[derive(Debug, Default, Deserialize)]
pub struct ExecutorFilter {
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub rate_min: Option<f64>,
    pub rate_max: Option<f64>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub subways: Option<String>,
}

/// Split a comma-separated filter value into trimmed, non-empty names.
pub fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_names_drops_blanks() {
        assert_eq!(split_names("Moscow, Kazan,,"), vec!["Moscow", "Kazan"]);
        assert!(split_names(" , ").is_empty());
    }
}
