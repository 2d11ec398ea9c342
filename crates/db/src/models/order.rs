//! Order entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use jobbit_core::types::{DbId, Timestamp};

/// A titled requirement attached to an order, stored inline as JSONB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSpecific {
    pub title: String,
    pub text: String,
}

/// A row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub number: i64,
    pub title: String,
    pub description: String,
    pub longitude: f64,
    pub latitude: f64,
    pub budget: Option<f64>,
    pub response_cost: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub comment: String,
    pub status: String,
    pub client_id: DbId,
    pub executor_id: Option<DbId>,
    pub specifics: Json<Vec<OrderSpecific>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an order. The client comes from the caller's profile.
#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    pub title: String,
    pub description: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub budget: Option<f64>,
    pub response_cost: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub comment: Option<String>,
    #[serde(default)]
    pub specifics: Vec<OrderSpecific>,
}

/// DTO for patching an order. `specifics`, when present, replaces the list.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrder {
    pub title: Option<String>,
    pub description: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub budget: Option<f64>,
    pub response_cost: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub comment: Option<String>,
    pub status: Option<String>,
    pub executor_id: Option<DbId>,
    pub specifics: Option<Vec<OrderSpecific>>,
}
