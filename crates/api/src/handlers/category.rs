//! Handlers for the category taxonomy.
//!
//! Reads are public and only return visible records; writes are admin only.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use jobbit_core::error::CoreError;
use jobbit_core::pagination::DEFAULT_PAGE_SIZE;
use jobbit_core::types::DbId;
use jobbit_core::validation::{
    validate_max_len, validate_opt_max_len, validate_required, MAX_NAME_LEN, MAX_TEXT_LEN,
};
use jobbit_db::models::category::{
    Category, CreateCategory, CreateSubcategory, Subcategory, UpdateCategory, UpdateSubcategory,
};
use jobbit_db::repositories::{CategoryRepo, SubcategoryRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{ensure_page, PageParams};
use crate::response::Paginated;
use crate::state::AppState;

/// A category with its visible subcategories.
#[derive(Debug, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Subcategory>,
}

fn validate_fields(name: Option<&str>, description: Option<&str>) -> Result<(), CoreError> {
    if let Some(name) = name {
        validate_required("name", name)?;
        validate_max_len("name", name, MAX_NAME_LEN)?;
    }
    validate_opt_max_len("description", description, MAX_TEXT_LEN)
}

async fn with_subcategories(
    state: &AppState,
    categories: Vec<Category>,
) -> AppResult<Vec<CategoryDetail>> {
    let ids: Vec<DbId> = categories.iter().map(|c| c.id).collect();
    let mut by_category: HashMap<DbId, Vec<Subcategory>> = HashMap::new();
    for sub in SubcategoryRepo::list_visible_for_categories(&state.pool, &ids).await? {
        by_category.entry(sub.category_id).or_default().push(sub);
    }
    Ok(categories
        .into_iter()
        .map(|category| CategoryDetail {
            subcategories: by_category.remove(&category.id).unwrap_or_default(),
            category,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// GET /api/v1/category
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Paginated<CategoryDetail>>> {
    let window = params.window(DEFAULT_PAGE_SIZE);
    let count = CategoryRepo::count_visible(&state.pool).await?;
    ensure_page(&window, count)?;
    let categories =
        CategoryRepo::list_visible(&state.pool, window.limit(), window.offset()).await?;
    let results = with_subcategories(&state, categories).await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/category/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<CategoryDetail>> {
    let category = CategoryRepo::find_visible(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Category",
            id,
        })?;
    let mut details = with_subcategories(&state, vec![category]).await?;
    Ok(Json(details.remove(0)))
}

/// POST /api/v1/category
pub async fn create_category(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    validate_fields(Some(&input.name), input.description.as_deref())?;
    let category = CategoryRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PATCH /api/v1/category/{id}
pub async fn update_category(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<Category>> {
    validate_fields(input.name.as_deref(), input.description.as_deref())?;
    let category = CategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Category",
            id,
        })?;
    Ok(Json(category))
}

/// DELETE /api/v1/category/{id}
pub async fn delete_category(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if CategoryRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound {
            entity: "Category",
            id,
        }
        .into())
    }
}

// ---------------------------------------------------------------------------
// Subcategories
// ---------------------------------------------------------------------------

/// GET /api/v1/sub_category
pub async fn list_subcategories(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Paginated<Subcategory>>> {
    let window = params.window(DEFAULT_PAGE_SIZE);
    let count = SubcategoryRepo::count_visible(&state.pool).await?;
    ensure_page(&window, count)?;
    let results =
        SubcategoryRepo::list_visible(&state.pool, window.limit(), window.offset()).await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/sub_category/{id}
pub async fn get_subcategory(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Subcategory>> {
    let sub = SubcategoryRepo::find_visible(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Subcategory",
            id,
        })?;
    Ok(Json(sub))
}

/// POST /api/v1/sub_category
pub async fn create_subcategory(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateSubcategory>,
) -> AppResult<(StatusCode, Json<Subcategory>)> {
    validate_fields(Some(&input.name), input.description.as_deref())?;
    let sub = SubcategoryRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(sub)))
}

/// PATCH /api/v1/sub_category/{id}
pub async fn update_subcategory(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSubcategory>,
) -> AppResult<Json<Subcategory>> {
    validate_fields(input.name.as_deref(), input.description.as_deref())?;
    let sub = SubcategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Subcategory",
            id,
        })?;
    Ok(Json(sub))
}

/// DELETE /api/v1/sub_category/{id}
pub async fn delete_subcategory(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if SubcategoryRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound {
            entity: "Subcategory",
            id,
        }
        .into())
    }
}
