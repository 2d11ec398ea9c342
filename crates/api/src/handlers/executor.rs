//! Handlers for executor profiles, their verification and the feedback
//! clients leave about them.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use jobbit_core::enums::ProfileRole;
use jobbit_core::error::CoreError;
use jobbit_core::pagination::DEFAULT_PAGE_SIZE;
use jobbit_core::types::DbId;
use jobbit_db::models::feedback::{AnswerFeedback, CreateFeedback, Feedback, UpdateFeedback};
use jobbit_db::models::profile::{CreateProfile, ExecutorFilter, Profile, UpdateProfile};
use jobbit_db::models::verification::{CreateVerification, Verification};
use jobbit_db::repositories::ProfileRepo;

use crate::error::AppResult;
use crate::handlers::profile;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{ensure_page, PageParams};
use crate::response::Paginated;
use crate::state::AppState;

const ROLE: ProfileRole = ProfileRole::Executor;

fn validate_filter(filter: &ExecutorFilter) -> Result<(), CoreError> {
    if let (Some(min), Some(max)) = (filter.price_min, filter.price_max) {
        if min > max {
            return Err(CoreError::Validation(
                "price_min: must not exceed price_max".into(),
            ));
        }
    }
    if let (Some(min), Some(max)) = (filter.rate_min, filter.rate_max) {
        if min > max {
            return Err(CoreError::Validation(
                "rate_min: must not exceed rate_max".into(),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// GET /api/v1/executor/profile
///
/// Filters: `price_min`, `price_max`, `rate_min`, `rate_max`, and the
/// comma-separated name lists `category`, `subcategory`, `city`, `region`,
/// `country`, `subways`.
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filter): Query<ExecutorFilter>,
) -> AppResult<Json<Paginated<Profile>>> {
    validate_filter(&filter)?;
    let window = params.window(DEFAULT_PAGE_SIZE);
    let count = ProfileRepo::count_executors(&state.pool, &filter).await?;
    ensure_page(&window, count)?;
    let results =
        ProfileRepo::list_executors(&state.pool, &filter, window.limit(), window.offset()).await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/executor/profile/{id}
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Profile>> {
    profile::get(&state, ROLE, id).await
}

/// POST /api/v1/executor/profile
pub async fn create_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProfile>,
) -> AppResult<(StatusCode, Json<Profile>)> {
    profile::create(&state, ROLE, &auth, input).await
}

/// PATCH /api/v1/executor/profile/{id}
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<Profile>> {
    profile::update(&state, ROLE, &auth, id, input).await
}

/// DELETE /api/v1/executor/profile/{id}
pub async fn delete_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    profile::delete(&state, ROLE, &auth, id).await
}

/// POST /api/v1/executor/verification
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

/// GET /api/v1/executor/{executor_id}/feedback
pub async fn list_feedback(
    State(state): State<AppState>,
    Path(executor_id): Path<DbId>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Paginated<Feedback>>> {
    profile::list_feedback(&state, ROLE, executor_id, params).await
}

/// GET /api/v1/executor/{executor_id}/feedback/{id}
pub async fn get_feedback(
    State(state): State<AppState>,
    Path((executor_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Feedback>> {
    profile::get_feedback(&state, ROLE, executor_id, id).await
}

/// POST /api/v1/executor/{executor_id}/feedback
///
/// The author is the caller's client profile.
pub async fn create_feedback(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(executor_id): Path<DbId>,
    Json(input): Json<CreateFeedback>,
) -> AppResult<(StatusCode, Json<Feedback>)> {
    profile::create_feedback(&state, ROLE, &auth, executor_id, input).await
}

/// PATCH /api/v1/executor/{executor_id}/feedback/{id}
pub async fn update_feedback(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((executor_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateFeedback>,
) -> AppResult<Json<Feedback>> {
    profile::update_feedback(&state, ROLE, &auth, executor_id, id, input).await
}

/// DELETE /api/v1/executor/{executor_id}/feedback/{id}
pub async fn delete_feedback(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((executor_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    profile::delete_feedback(&state, ROLE, executor_id, id).await
}

/// POST /api/v1/executor/{executor_id}/feedback/{id}/answer
pub async fn answer_feedback(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((executor_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<AnswerFeedback>,
) -> AppResult<Json<Feedback>> {
    profile::answer_feedback(&state, ROLE, &auth, executor_id, id, input).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_bounds_are_rejected() {
        let filter = ExecutorFilter {
            price_min: Some(500.0),
            price_max: Some(100.0),
            ..Default::default()
        };
        assert!(validate_filter(&filter).is_err());
        assert!(validate_filter(&ExecutorFilter::default()).is_ok());
    }
}
