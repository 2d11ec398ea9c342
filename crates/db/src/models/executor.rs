//! Executor detail records: experience, services, portfolio, address, geography.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use jobbit_core::types::DbId;

// ---------------------------------------------------------------------------
// Experience
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Experience {
    pub id: DbId,
    pub executor_id: DbId,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    pub is_visible: bool,
    pub is_approved: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateExperience {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    pub is_visible: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExperience {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub finish_date: Option<NaiveDate>,
    pub is_visible: Option<bool>,
}

/// A document or photo attached to an experience entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExperienceFile {
    pub id: DbId,
    pub experience_id: DbId,
    pub name: String,
    pub photo: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateExperienceFile {
    pub experience_id: DbId,
    pub name: String,
    pub photo: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExperienceFile {
    pub name: Option<String>,
    pub photo: Option<String>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Service {
    pub id: DbId,
    pub executor_id: DbId,
    pub subcategory_id: DbId,
    pub photo: String,
    pub description: String,
    pub price: f64,
    pub time_unit: String,
    pub has_departure: bool,
    pub departure_cost: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateService {
    pub subcategory_id: DbId,
    pub photo: String,
    pub description: String,
    pub price: f64,
    pub time_unit: String,
    pub has_departure: Option<bool>,
    pub departure_cost: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateService {
    pub subcategory_id: Option<DbId>,
    pub photo: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub time_unit: Option<String>,
    pub has_departure: Option<bool>,
    pub departure_cost: Option<f64>,
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Portfolio {
    pub id: DbId,
    pub executor_id: DbId,
    pub description: String,
    pub photo: String,
    pub subcategory_ids: Vec<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePortfolio {
    pub description: String,
    pub photo: String,
    #[serde(default)]
    pub subcategory_ids: Vec<DbId>,
}

/// `subcategory_ids`, when present, replaces the whole set.
#[derive(Debug, Deserialize)]
pub struct UpdatePortfolio {
    pub description: Option<String>,
    pub photo: Option<String>,
    pub subcategory_ids: Option<Vec<DbId>>,
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Address {
    pub id: DbId,
    pub executor_id: DbId,
    pub city_id: DbId,
    pub street: String,
    pub home: String,
    pub office: String,
    pub room: String,
    pub postal_index: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAddress {
    pub city_id: DbId,
    pub street: String,
    pub home: String,
    pub office: Option<String>,
    pub room: Option<String>,
    pub postal_index: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAddress {
    pub city_id: Option<DbId>,
    pub street: Option<String>,
    pub home: Option<String>,
    pub office: Option<String>,
    pub room: Option<String>,
    pub postal_index: Option<String>,
}

// ---------------------------------------------------------------------------
// Geo
// ---------------------------------------------------------------------------

/// Where an executor works: remotely and/or near a set of subway stations.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Geo {
    pub id: DbId,
    pub executor_id: DbId,
    pub remote_work_ability: bool,
    pub subway_ids: Vec<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGeo {
    pub remote_work_ability: Option<bool>,
    #[serde(default)]
    pub subway_ids: Vec<DbId>,
}

/// `subway_ids`, when present, replaces the whole set.
#[derive(Debug, Deserialize)]
pub struct UpdateGeo {
    pub remote_work_ability: Option<bool>,
    pub subway_ids: Option<Vec<DbId>>,
}
