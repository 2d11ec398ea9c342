//! Handlers for the records describing an executor's work: experience and
//! its files, services, portfolio, address and work area.
//!
//! Lists and single reads are public. Creation binds the record to the
//! caller's executor profile; updates and deletes are allowed only to the
//! executor owning the record.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use jobbit_core::enums::{ProfileRole, TimeUnit};
use jobbit_core::error::CoreError;
use jobbit_core::pagination::{PageWindow, DEFAULT_PAGE_SIZE};
use jobbit_core::types::DbId;
use jobbit_core::validation::{
    validate_date_range, validate_max_len, validate_non_negative, validate_opt_max_len,
    validate_required, MAX_SERVICE_DESCRIPTION_LEN, MAX_TEXT_LEN,
};
use jobbit_db::models::executor::{
    Address, CreateAddress, CreateExperience, CreateExperienceFile, CreateGeo, CreatePortfolio,
    CreateService, Experience, ExperienceFile, Geo, Portfolio, Service, UpdateAddress,
    UpdateExperience, UpdateExperienceFile, UpdateGeo, UpdatePortfolio, UpdateService,
};
use jobbit_db::repositories::{
    AddressRepo, ExperienceFileRepo, ExperienceRepo, PortfolioRepo, ProfileRepo, ServiceRepo,
    WorkAreaRepo,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::profile::{forbidden, require_profile};
use crate::middleware::auth::AuthUser;
use crate::query::ensure_page;
use crate::response::Paginated;
use crate::state::AppState;

const MAX_EXPERIENCE_NAME_LEN: usize = 100;

/// `?executor=&page=` for executor-owned lists.
#[derive(Debug, Deserialize)]
pub struct ExecutorParams {
    pub executor: Option<DbId>,
    pub page: Option<i64>,
}

impl ExecutorParams {
    fn window(&self) -> PageWindow {
        PageWindow::new(self.page, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Deserialize)]
pub struct ExperienceFileParams {
    pub experience: Option<DbId>,
    pub page: Option<i64>,
}

fn not_found(entity: &'static str, id: DbId) -> CoreError {
    CoreError::NotFound { entity, id }
}

/// The caller's executor profile id, for creating records.
async fn caller_executor(state: &AppState, auth: &AuthUser) -> AppResult<DbId> {
    Ok(require_profile(state, ProfileRole::Executor, auth.user_id)
        .await?
        .id)
}

/// Reject unless the caller's executor profile is `executor_id`.
async fn ensure_owner(state: &AppState, auth: &AuthUser, executor_id: DbId) -> AppResult<()> {
    let own = ProfileRepo::find_by_user(&state.pool, ProfileRole::Executor, auth.user_id).await?;
    if own.map(|p| p.id) == Some(executor_id) {
        Ok(())
    } else {
        Err(forbidden())
    }
}

// ---------------------------------------------------------------------------
// Experience
// ---------------------------------------------------------------------------

fn validate_experience(
    name: Option<&str>,
    description: Option<&str>,
) -> Result<(), CoreError> {
    if let Some(name) = name {
        validate_required("name", name)?;
        validate_max_len("name", name, MAX_EXPERIENCE_NAME_LEN)?;
    }
    validate_opt_max_len("description", description, MAX_TEXT_LEN)
}

/// GET /api/v1/executor/experience
pub async fn list_experience(
    State(state): State<AppState>,
    Query(params): Query<ExecutorParams>,
) -> AppResult<Json<Paginated<Experience>>> {
    let window = params.window();
    let count = ExperienceRepo::count(&state.pool, params.executor).await?;
    ensure_page(&window, count)?;
    let results =
        ExperienceRepo::list(&state.pool, params.executor, window.limit(), window.offset())
            .await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/executor/experience/{id}
pub async fn get_experience(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Experience>> {
    let experience = ExperienceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorExperience", id))?;
    Ok(Json(experience))
}

/// POST /api/v1/executor/experience
pub async fn create_experience(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateExperience>,
) -> AppResult<(StatusCode, Json<Experience>)> {
    let executor_id = caller_executor(&state, &auth).await?;
    validate_experience(Some(&input.name), Some(&input.description))?;
    validate_date_range(Some(input.start_date), Some(input.finish_date))?;
    let experience = ExperienceRepo::create(&state.pool, executor_id, &input).await?;
    Ok((StatusCode::CREATED, Json(experience)))
}

/// PATCH /api/v1/executor/experience/{id}
pub async fn update_experience(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateExperience>,
) -> AppResult<Json<Experience>> {
    let existing = ExperienceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorExperience", id))?;
    ensure_owner(&state, &auth, existing.executor_id).await?;
    validate_experience(input.name.as_deref(), input.description.as_deref())?;
    validate_date_range(
        Some(input.start_date.unwrap_or(existing.start_date)),
        Some(input.finish_date.unwrap_or(existing.finish_date)),
    )?;

    let experience = ExperienceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found("ExecutorExperience", id))?;
    Ok(Json(experience))
}

/// DELETE /api/v1/executor/experience/{id}
pub async fn delete_experience(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = ExperienceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorExperience", id))?;
    ensure_owner(&state, &auth, existing.executor_id).await?;
    ExperienceRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Experience files
// ---------------------------------------------------------------------------

/// GET /api/v1/executor/experience_file
pub async fn list_experience_files(
    State(state): State<AppState>,
    Query(params): Query<ExperienceFileParams>,
) -> AppResult<Json<Paginated<ExperienceFile>>> {
    let window = PageWindow::new(params.page, DEFAULT_PAGE_SIZE);
    let count = ExperienceFileRepo::count(&state.pool, params.experience).await?;
    ensure_page(&window, count)?;
    let results = ExperienceFileRepo::list(
        &state.pool,
        params.experience,
        window.limit(),
        window.offset(),
    )
    .await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/executor/experience_file/{id}
pub async fn get_experience_file(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ExperienceFile>> {
    let file = ExperienceFileRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExperienceFile", id))?;
    Ok(Json(file))
}

/// POST /api/v1/executor/experience_file
///
/// The experience must belong to the caller.
pub async fn create_experience_file(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateExperienceFile>,
) -> AppResult<(StatusCode, Json<ExperienceFile>)> {
    caller_executor(&state, &auth).await?;
    let experience = ExperienceRepo::find_by_id(&state.pool, input.experience_id)
        .await?
        .ok_or(not_found("ExecutorExperience", input.experience_id))?;
    ensure_owner(&state, &auth, experience.executor_id).await?;
    validate_required("name", &input.name)?;

    let file = ExperienceFileRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(file)))
}

/// PATCH /api/v1/executor/experience_file/{id}
pub async fn update_experience_file(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateExperienceFile>,
) -> AppResult<Json<ExperienceFile>> {
    let owner = ExperienceFileRepo::owner_executor_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExperienceFile", id))?;
    ensure_owner(&state, &auth, owner).await?;

    let file = ExperienceFileRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found("ExperienceFile", id))?;
    Ok(Json(file))
}

/// DELETE /api/v1/executor/experience_file/{id}
pub async fn delete_experience_file(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let owner = ExperienceFileRepo::owner_executor_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExperienceFile", id))?;
    ensure_owner(&state, &auth, owner).await?;
    ExperienceFileRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

fn validate_service(
    description: Option<&str>,
    price: Option<f64>,
    time_unit: Option<&str>,
    departure_cost: Option<f64>,
) -> Result<(), CoreError> {
    validate_opt_max_len("description", description, MAX_SERVICE_DESCRIPTION_LEN)?;
    if let Some(price) = price {
        validate_non_negative("price", price)?;
    }
    if let Some(unit) = time_unit {
        TimeUnit::from_str(unit)?;
    }
    if let Some(cost) = departure_cost {
        validate_non_negative("departure_cost", cost)?;
    }
    Ok(())
}

/// GET /api/v1/executor/service
pub async fn list_services(
    State(state): State<AppState>,
    Query(params): Query<ExecutorParams>,
) -> AppResult<Json<Paginated<Service>>> {
    let window = params.window();
    let count = ServiceRepo::count(&state.pool, params.executor).await?;
    ensure_page(&window, count)?;
    let results =
        ServiceRepo::list(&state.pool, params.executor, window.limit(), window.offset()).await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/executor/service/{id}
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Service>> {
    let service = ServiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorService", id))?;
    Ok(Json(service))
}

/// POST /api/v1/executor/service
pub async fn create_service(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateService>,
) -> AppResult<(StatusCode, Json<Service>)> {
    let executor_id = caller_executor(&state, &auth).await?;
    validate_service(
        Some(&input.description),
        Some(input.price),
        Some(&input.time_unit),
        input.departure_cost,
    )?;
    let service = ServiceRepo::create(&state.pool, executor_id, &input).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// PATCH /api/v1/executor/service/{id}
pub async fn update_service(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateService>,
) -> AppResult<Json<Service>> {
    let existing = ServiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorService", id))?;
    ensure_owner(&state, &auth, existing.executor_id).await?;
    validate_service(
        input.description.as_deref(),
        input.price,
        input.time_unit.as_deref(),
        input.departure_cost,
    )?;

    let service = ServiceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found("ExecutorService", id))?;
    Ok(Json(service))
}

/// DELETE /api/v1/executor/service/{id}
pub async fn delete_service(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = ServiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorService", id))?;
    ensure_owner(&state, &auth, existing.executor_id).await?;
    ServiceRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

/// GET /api/v1/executor/portfolio
pub async fn list_portfolio(
    State(state): State<AppState>,
    Query(params): Query<ExecutorParams>,
) -> AppResult<Json<Paginated<Portfolio>>> {
    let window = params.window();
    let count = PortfolioRepo::count(&state.pool, params.executor).await?;
    ensure_page(&window, count)?;
    let results =
        PortfolioRepo::list(&state.pool, params.executor, window.limit(), window.offset())
            .await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/executor/portfolio/{id}
pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Portfolio>> {
    let portfolio = PortfolioRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorPortfolio", id))?;
    Ok(Json(portfolio))
}

/// POST /api/v1/executor/portfolio
pub async fn create_portfolio(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePortfolio>,
) -> AppResult<(StatusCode, Json<Portfolio>)> {
    let executor_id = caller_executor(&state, &auth).await?;
    validate_max_len("description", &input.description, MAX_TEXT_LEN)?;
    let portfolio = PortfolioRepo::create(&state.pool, executor_id, &input).await?;
    Ok((StatusCode::CREATED, Json(portfolio)))
}

/// PATCH /api/v1/executor/portfolio/{id}
pub async fn update_portfolio(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePortfolio>,
) -> AppResult<Json<Portfolio>> {
    let existing = PortfolioRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorPortfolio", id))?;
    ensure_owner(&state, &auth, existing.executor_id).await?;
    validate_opt_max_len("description", input.description.as_deref(), MAX_TEXT_LEN)?;

    let portfolio = PortfolioRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found("ExecutorPortfolio", id))?;
    Ok(Json(portfolio))
}

/// DELETE /api/v1/executor/portfolio/{id}
pub async fn delete_portfolio(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = PortfolioRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorPortfolio", id))?;
    ensure_owner(&state, &auth, existing.executor_id).await?;
    PortfolioRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// GET /api/v1/executor/address
pub async fn list_addresses(
    State(state): State<AppState>,
    Query(params): Query<ExecutorParams>,
) -> AppResult<Json<Paginated<Address>>> {
    let window = params.window();
    let count = AddressRepo::count(&state.pool, params.executor).await?;
    ensure_page(&window, count)?;
    let results =
        AddressRepo::list(&state.pool, params.executor, window.limit(), window.offset()).await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/executor/address/{id}
pub async fn get_address(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Address>> {
    let address = AddressRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorAddress", id))?;
    Ok(Json(address))
}

/// POST /api/v1/executor/address
///
/// One address per executor; a second one is 409.
pub async fn create_address(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAddress>,
) -> AppResult<(StatusCode, Json<Address>)> {
    let executor_id = caller_executor(&state, &auth).await?;
    validate_required("street", &input.street)?;
    validate_required("home", &input.home)?;
    let address = AddressRepo::create(&state.pool, executor_id, &input).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// PATCH /api/v1/executor/address/{id}
pub async fn update_address(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAddress>,
) -> AppResult<Json<Address>> {
    let existing = AddressRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorAddress", id))?;
    ensure_owner(&state, &auth, existing.executor_id).await?;

    let address = AddressRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found("ExecutorAddress", id))?;
    Ok(Json(address))
}

/// DELETE /api/v1/executor/address/{id}
pub async fn delete_address(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = AddressRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorAddress", id))?;
    ensure_owner(&state, &auth, existing.executor_id).await?;
    AddressRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Work area
// ---------------------------------------------------------------------------

/// GET /api/v1/executor/geo
pub async fn list_geos(
    State(state): State<AppState>,
    Query(params): Query<ExecutorParams>,
) -> AppResult<Json<Paginated<Geo>>> {
    let window = params.window();
    let count = WorkAreaRepo::count(&state.pool, params.executor).await?;
    ensure_page(&window, count)?;
    let results =
        WorkAreaRepo::list(&state.pool, params.executor, window.limit(), window.offset()).await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/executor/geo/{id}
pub async fn get_geo(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Geo>> {
    let geo = WorkAreaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorGeo", id))?;
    Ok(Json(geo))
}

/// POST /api/v1/executor/geo
pub async fn create_geo(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateGeo>,
) -> AppResult<(StatusCode, Json<Geo>)> {
    let executor_id = caller_executor(&state, &auth).await?;
    let geo = WorkAreaRepo::create(&state.pool, executor_id, &input).await?;
    Ok((StatusCode::CREATED, Json(geo)))
}

/// PATCH /api/v1/executor/geo/{id}
pub async fn update_geo(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateGeo>,
) -> AppResult<Json<Geo>> {
    let existing = WorkAreaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorGeo", id))?;
    ensure_owner(&state, &auth, existing.executor_id).await?;

    let geo = WorkAreaRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found("ExecutorGeo", id))?;
    Ok(Json(geo))
}

/// DELETE /api/v1/executor/geo/{id}
pub async fn delete_geo(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = WorkAreaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("ExecutorGeo", id))?;
    ensure_owner(&state, &auth, existing.executor_id).await?;
    WorkAreaRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_fields() {
        assert!(validate_service(Some("Cleaning"), Some(10.0), Some("HOURLY"), None).is_ok());
        assert!(validate_service(None, Some(-1.0), None, None).is_err());
        assert!(validate_service(None, None, Some("YEARLY"), None).is_err());
        assert!(validate_service(Some(&"x".repeat(101)), None, None, None).is_err());
    }

    #[test]
    fn experience_name_limit() {
        assert!(validate_experience(Some(&"n".repeat(100)), None).is_ok());
        assert!(validate_experience(Some(&"n".repeat(101)), None).is_err());
        assert!(validate_experience(Some("  "), None).is_err());
    }
}
