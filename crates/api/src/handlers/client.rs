//! Handlers for the `/client` resource: client profiles, their
//! verification and the feedback executors leave about them.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use jobbit_core::enums::ProfileRole;
use jobbit_core::pagination::DEFAULT_PAGE_SIZE;
use jobbit_core::types::DbId;
use jobbit_db::models::feedback::{AnswerFeedback, CreateFeedback, Feedback, UpdateFeedback};
use jobbit_db::models::profile::{CreateProfile, Profile, UpdateProfile};
use jobbit_db::models::verification::{CreateVerification, Verification};
use jobbit_db::repositories::ProfileRepo;

use crate::error::AppResult;
use crate::handlers::profile;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{ensure_page, PageParams};
use crate::response::Paginated;
use crate::state::AppState;

const ROLE: ProfileRole = ProfileRole::Client;

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// GET /api/v1/client/profile
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Paginated<Profile>>> {
    let window = params.window(DEFAULT_PAGE_SIZE);
    let count = ProfileRepo::count_clients(&state.pool).await?;
    ensure_page(&window, count)?;
    let results = ProfileRepo::list_clients(&state.pool, window.limit(), window.offset()).await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/client/profile/{id}
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Profile>> {
    profile::get(&state, ROLE, id).await
}

/// POST /api/v1/client/profile
pub async fn create_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProfile>,
) -> AppResult<(StatusCode, Json<Profile>)> {
    profile::create(&state, ROLE, &auth, input).await
}

/// PATCH /api/v1/client/profile/{id}
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<Profile>> {
    profile::update(&state, ROLE, &auth, id, input).await
}

/// DELETE /api/v1/client/profile/{id}
pub async fn delete_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    profile::delete(&state, ROLE, &auth, id).await
}

/// POST /api/v1/client/verification
pub async fn create_verification(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateVerification>,
) -> AppResult<(StatusCode, Json<Verification>)> {
    profile::verify(&state, ROLE, &auth, input).await
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// GET /api/v1/client/{client_id}/feedback
pub async fn list_feedback(
    State(state): State<AppState>,
    Path(client_id): Path<DbId>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Paginated<Feedback>>> {
    profile::list_feedback(&state, ROLE, client_id, params).await
}

/// GET /api/v1/client/{client_id}/feedback/{id}
pub async fn get_feedback(
    State(state): State<AppState>,
    Path((client_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Feedback>> {
    profile::get_feedback(&state, ROLE, client_id, id).await
}

/// POST /api/v1/client/{client_id}/feedback
///
/// The author is the caller's executor profile.
pub async fn create_feedback(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(client_id): Path<DbId>,
    Json(input): Json<CreateFeedback>,
) -> AppResult<(StatusCode, Json<Feedback>)> {
    profile::create_feedback(&state, ROLE, &auth, client_id, input).await
}

/// PATCH /api/v1/client/{client_id}/feedback/{id}
pub async fn update_feedback(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((client_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateFeedback>,
) -> AppResult<Json<Feedback>> {
    profile::update_feedback(&state, ROLE, &auth, client_id, id, input).await
}

/// DELETE /api/v1/client/{client_id}/feedback/{id}
pub async fn delete_feedback(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((client_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    profile::delete_feedback(&state, ROLE, client_id, id).await
}

/// POST /api/v1/client/{client_id}/feedback/{id}/answer
pub async fn answer_feedback(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((client_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<AnswerFeedback>,
) -> AppResult<Json<Feedback>> {
    profile::answer_feedback(&state, ROLE, &auth, client_id, id, input).await
}
