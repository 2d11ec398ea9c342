//! Category and subcategory models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use jobbit_core::types::DbId;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub is_visible: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    pub is_visible: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_visible: Option<bool>,
}

/// A row from the `subcategories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subcategory {
    pub id: DbId,
    pub category_id: DbId,
    pub name: String,
    pub description: String,
    pub is_visible: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubcategory {
    pub category_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_visible: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSubcategory {
    pub category_id: Option<DbId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_visible: Option<bool>,
}
