//! Handlers for the geographic hierarchy.
//!
//! Reads are public; creation and deletion are admin only. List endpoints
//! filter by the parent record (`?country=`, `?region=`, `?city=`,
//! `?branch=`).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use jobbit_core::error::CoreError;
use jobbit_core::pagination::{PageWindow, DEFAULT_PAGE_SIZE};
use jobbit_core::types::DbId;
use jobbit_core::validation::{validate_hex_color, validate_required};
use jobbit_db::models::geo::{
    City, Country, CreateCity, CreateCountry, CreateRegion, CreateSubway, CreateSubwayBranch,
    Region, Subway, SubwayBranch,
};
use jobbit_db::repositories::GeoRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{ensure_page, PageParams};
use crate::response::Paginated;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegionParams {
    pub country: Option<DbId>,
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CityParams {
    pub region: Option<DbId>,
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BranchParams {
    pub city: Option<DbId>,
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SubwayParams {
    pub branch: Option<DbId>,
    pub page: Option<i64>,
}

fn not_found(entity: &'static str, id: DbId) -> CoreError {
    CoreError::NotFound { entity, id }
}

fn deleted(found: bool, entity: &'static str, id: DbId) -> AppResult<StatusCode> {
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(entity, id).into())
    }
}

// ---------------------------------------------------------------------------
// Countries
// ---------------------------------------------------------------------------

/// GET /api/v1/geo/country
pub async fn list_countries(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Paginated<Country>>> {
    let window = params.window(DEFAULT_PAGE_SIZE);
    let count = GeoRepo::count_countries(&state.pool).await?;
    ensure_page(&window, count)?;
    let results = GeoRepo::list_countries(&state.pool, window.limit(), window.offset()).await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/geo/country/{id}
pub async fn get_country(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Country>> {
    let country = GeoRepo::find_country(&state.pool, id)
        .await?
        .ok_or(not_found("Country", id))?;
    Ok(Json(country))
}

/// POST /api/v1/geo/country
pub async fn create_country(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCountry>,
) -> AppResult<(StatusCode, Json<Country>)> {
    validate_required("name", &input.name)?;
    let country = GeoRepo::create_country(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(country)))
}

/// DELETE /api/v1/geo/country/{id}
pub async fn delete_country(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(GeoRepo::delete_country(&state.pool, id).await?, "Country", id)
}

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// GET /api/v1/geo/region
pub async fn list_regions(
    State(state): State<AppState>,
    Query(params): Query<RegionParams>,
) -> AppResult<Json<Paginated<Region>>> {
    let window = PageWindow::new(params.page, DEFAULT_PAGE_SIZE);
    let count = GeoRepo::count_regions(&state.pool, params.country).await?;
    ensure_page(&window, count)?;
    let results =
        GeoRepo::list_regions(&state.pool, params.country, window.limit(), window.offset())
            .await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/geo/region/{id}
pub async fn get_region(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Region>> {
    let region = GeoRepo::find_region(&state.pool, id)
        .await?
        .ok_or(not_found("Region", id))?;
    Ok(Json(region))
}

/// POST /api/v1/geo/region
pub async fn create_region(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateRegion>,
) -> AppResult<(StatusCode, Json<Region>)> {
    validate_required("name", &input.name)?;
    let region = GeoRepo::create_region(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(region)))
}

/// DELETE /api/v1/geo/region/{id}
pub async fn delete_region(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(GeoRepo::delete_region(&state.pool, id).await?, "Region", id)
}

// ---------------------------------------------------------------------------
// Cities
// ---------------------------------------------------------------------------

/// GET /api/v1/geo/city
pub async fn list_cities(
    State(state): State<AppState>,
    Query(params): Query<CityParams>,
) -> AppResult<Json<Paginated<City>>> {
    let window = PageWindow::new(params.page, DEFAULT_PAGE_SIZE);
    let count = GeoRepo::count_cities(&state.pool, params.region).await?;
    ensure_page(&window, count)?;
    let results =
        GeoRepo::list_cities(&state.pool, params.region, window.limit(), window.offset()).await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/geo/city/{id}
pub async fn get_city(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<City>> {
    let city = GeoRepo::find_city(&state.pool, id)
        .await?
        .ok_or(not_found("City", id))?;
    Ok(Json(city))
}

/// POST /api/v1/geo/city
pub async fn create_city(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCity>,
) -> AppResult<(StatusCode, Json<City>)> {
    validate_required("name", &input.name)?;
    let city = GeoRepo::create_city(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(city)))
}

/// DELETE /api/v1/geo/city/{id}
pub async fn delete_city(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(GeoRepo::delete_city(&state.pool, id).await?, "City", id)
}

// ---------------------------------------------------------------------------
// Subway branches
// ---------------------------------------------------------------------------

/// GET /api/v1/geo/subway_branch
pub async fn list_subway_branches(
    State(state): State<AppState>,
    Query(params): Query<BranchParams>,
) -> AppResult<Json<Paginated<SubwayBranch>>> {
    let window = PageWindow::new(params.page, DEFAULT_PAGE_SIZE);
    let count = GeoRepo::count_subway_branches(&state.pool, params.city).await?;
    ensure_page(&window, count)?;
    let results =
        GeoRepo::list_subway_branches(&state.pool, params.city, window.limit(), window.offset())
            .await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/geo/subway_branch/{id}
pub async fn get_subway_branch(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SubwayBranch>> {
    let branch = GeoRepo::find_subway_branch(&state.pool, id)
        .await?
        .ok_or(not_found("SubwayBranch", id))?;
    Ok(Json(branch))
}

/// POST /api/v1/geo/subway_branch
pub async fn create_subway_branch(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateSubwayBranch>,
) -> AppResult<(StatusCode, Json<SubwayBranch>)> {
    validate_required("name", &input.name)?;
    validate_hex_color(&input.color)?;
    let branch = GeoRepo::create_subway_branch(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

/// DELETE /api/v1/geo/subway_branch/{id}
pub async fn delete_subway_branch(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(
        GeoRepo::delete_subway_branch(&state.pool, id).await?,
        "SubwayBranch",
        id,
    )
}

// ---------------------------------------------------------------------------
// Subways
// ---------------------------------------------------------------------------

/// GET /api/v1/geo/subway
pub async fn list_subways(
    State(state): State<AppState>,
    Query(params): Query<SubwayParams>,
) -> AppResult<Json<Paginated<Subway>>> {
    let window = PageWindow::new(params.page, DEFAULT_PAGE_SIZE);
    let count = GeoRepo::count_subways(&state.pool, params.branch).await?;
    ensure_page(&window, count)?;
    let results =
        GeoRepo::list_subways(&state.pool, params.branch, window.limit(), window.offset())
            .await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/geo/subway/{id}
pub async fn get_subway(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Subway>> {
    let subway = GeoRepo::find_subway(&state.pool, id)
        .await?
        .ok_or(not_found("Subway", id))?;
    Ok(Json(subway))
}

/// POST /api/v1/geo/subway
pub async fn create_subway(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateSubway>,
) -> AppResult<(StatusCode, Json<Subway>)> {
    validate_required("name", &input.name)?;
    let subway = GeoRepo::create_subway(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(subway)))
}

/// DELETE /api/v1/geo/subway/{id}
pub async fn delete_subway(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(GeoRepo::delete_subway(&state.pool, id).await?, "Subway", id)
}
