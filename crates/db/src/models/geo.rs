//! Geographic hierarchy: country, region, city, subway branch, subway.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use jobbit_core::types::DbId;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Country {
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCountry {
    pub name: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Region {
    pub id: DbId,
    pub country_id: DbId,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRegion {
    pub country_id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct City {
    pub id: DbId,
    pub region_id: DbId,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateCity {
    pub region_id: DbId,
    pub name: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubwayBranch {
    pub id: DbId,
    pub city_id: DbId,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubwayBranch {
    pub city_id: DbId,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subway {
    pub id: DbId,
    pub city_id: DbId,
    pub branch_id: DbId,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubway {
    pub city_id: DbId,
    pub branch_id: DbId,
    pub name: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}
