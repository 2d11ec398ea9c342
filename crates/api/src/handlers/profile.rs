//! Operations shared by client and executor profiles.
//!
//! Both profile kinds have the same lifecycle, verification and feedback
//! rules; the `client` and `executor` handler modules bind them to routes
//! with a fixed [`ProfileRole`]. Feedback on a profile is always written by
//! a profile of the opposite kind.

use std::str::FromStr;

use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use jobbit_core::enums::{Gender, ProfileRole};
use jobbit_core::error::CoreError;
use jobbit_core::pagination::DEFAULT_PAGE_SIZE;
use jobbit_core::types::DbId;
use jobbit_core::validation::{
    validate_adult, validate_email, validate_max_len, validate_opt_max_len, validate_phone_number,
    validate_rate, validate_required, MAX_TEXT_LEN,
};
use jobbit_db::models::feedback::{AnswerFeedback, CreateFeedback, Feedback, UpdateFeedback};
use jobbit_db::models::profile::{CreateProfile, Profile, UpdateProfile};
use jobbit_db::models::verification::{CreateVerification, Verification};
use jobbit_db::repositories::{FeedbackRepo, ProfileRepo, VerificationRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{ensure_page, PageParams};
use crate::response::Paginated;
use crate::state::AppState;

pub const NO_PERMISSION: &str = "You do not have permission to perform this action.";

/// The profile kind that writes feedback about `role`.
pub fn counterpart(role: ProfileRole) -> ProfileRole {
    match role {
        ProfileRole::Client => ProfileRole::Executor,
        ProfileRole::Executor => ProfileRole::Client,
    }
}

fn entity(role: ProfileRole) -> &'static str {
    match role {
        ProfileRole::Client => "ClientProfile",
        ProfileRole::Executor => "ExecutorProfile",
    }
}

fn feedback_entity(role: ProfileRole) -> &'static str {
    match role {
        ProfileRole::Client => "ClientFeedback",
        ProfileRole::Executor => "ExecutorFeedback",
    }
}

pub fn forbidden() -> AppError {
    AppError::Core(CoreError::Forbidden(NO_PERMISSION.into()))
}

/// The caller's profile of `role`, or 400 "<Role> profile required".
pub async fn require_profile(
    state: &AppState,
    role: ProfileRole,
    user_id: DbId,
) -> AppResult<Profile> {
    ProfileRepo::find_by_user(&state.pool, role, user_id)
        .await?
        .ok_or_else(|| {
            AppError::Detail(match role {
                ProfileRole::Client => "Client profile required".into(),
                ProfileRole::Executor => "Executor profile required".into(),
            })
        })
}

/// A profile by id, or 404.
pub async fn load_profile(state: &AppState, role: ProfileRole, id: DbId) -> AppResult<Profile> {
    ProfileRepo::find_by_id(&state.pool, role, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: entity(role),
                id,
            }
            .into()
        })
}

fn validate_profile_fields(
    email: Option<&str>,
    phone_number: Option<&str>,
    gender: Option<&str>,
    bio: Option<&str>,
) -> Result<(), CoreError> {
    if let Some(email) = email {
        validate_email(email)?;
    }
    if let Some(phone) = phone_number {
        validate_phone_number(phone)?;
    }
    if let Some(gender) = gender {
        Gender::from_str(gender)?;
    }
    validate_opt_max_len("bio", bio, MAX_TEXT_LEN)
}

fn validate_feedback_text(text: &str) -> Result<(), CoreError> {
    validate_required("text", text)?;
    validate_max_len("text", text, MAX_TEXT_LEN)
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

pub async fn get(state: &AppState, role: ProfileRole, id: DbId) -> AppResult<Json<Profile>> {
    Ok(Json(load_profile(state, role, id).await?))
}

pub async fn create(
    state: &AppState,
    role: ProfileRole,
    auth: &AuthUser,
    input: CreateProfile,
) -> AppResult<(StatusCode, Json<Profile>)> {
    validate_profile_fields(
        input.email.as_deref(),
        input.phone_number.as_deref(),
        input.gender.as_deref(),
        input.bio.as_deref(),
    )?;
    if ProfileRepo::exists_for_user(&state.pool, role, auth.user_id).await? {
        return Err(CoreError::Conflict(format!(
            "{} already exists for this user",
            entity(role)
        ))
        .into());
    }

    let profile = ProfileRepo::create(&state.pool, role, auth.user_id, &input).await?;
    tracing::info!(profile_id = %profile.id, user_id = %auth.user_id, role = %role, "Profile created");
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn update(
    state: &AppState,
    role: ProfileRole,
    auth: &AuthUser,
    id: DbId,
    input: UpdateProfile,
) -> AppResult<Json<Profile>> {
    let profile = load_profile(state, role, id).await?;
    if profile.user_id != auth.user_id {
        return Err(forbidden());
    }
    validate_profile_fields(
        input.email.as_deref(),
        input.phone_number.as_deref(),
        input.gender.as_deref(),
        input.bio.as_deref(),
    )?;

    let updated = ProfileRepo::update(&state.pool, role, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: entity(role),
            id,
        })?;
    Ok(Json(updated))
}

pub async fn delete(
    state: &AppState,
    role: ProfileRole,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<StatusCode> {
    let profile = load_profile(state, role, id).await?;
    if profile.user_id != auth.user_id {
        return Err(forbidden());
    }
    ProfileRepo::delete(&state.pool, role, id).await?;
    tracing::info!(profile_id = %id, role = %role, "Profile deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Submit identity documents for the caller's profile of `role`.
pub async fn verify(
    state: &AppState,
    role: ProfileRole,
    auth: &AuthUser,
    input: CreateVerification,
) -> AppResult<(StatusCode, Json<Verification>)> {
    let profile = require_profile(state, role, auth.user_id).await?;
    validate_required("first_name", &input.first_name)?;
    validate_required("last_name", &input.last_name)?;
    validate_required("address", &input.address)?;
    validate_adult(input.birthday, Utc::now().date_naive())?;

    if VerificationRepo::find_by_profile(&state.pool, role, profile.id)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict("Verification for this profile already exists".into()).into());
    }

    let verification = VerificationRepo::create(&state.pool, role, profile.id, &input).await?;
    tracing::info!(profile_id = %profile.id, role = %role, "Verification submitted");
    Ok((StatusCode::CREATED, Json(verification)))
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

async fn load_feedback(
    state: &AppState,
    role: ProfileRole,
    profile_id: DbId,
    id: DbId,
) -> AppResult<Feedback> {
    FeedbackRepo::find(&state.pool, role, profile_id, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: feedback_entity(role),
                id,
            }
            .into()
        })
}

pub async fn list_feedback(
    state: &AppState,
    role: ProfileRole,
    profile_id: DbId,
    params: PageParams,
) -> AppResult<Json<Paginated<Feedback>>> {
    load_profile(state, role, profile_id).await?;
    let window = params.window(DEFAULT_PAGE_SIZE);
    let count = FeedbackRepo::count_for_profile(&state.pool, role, profile_id).await?;
    ensure_page(&window, count)?;
    let results = FeedbackRepo::list_for_profile(
        &state.pool,
        role,
        profile_id,
        window.limit(),
        window.offset(),
    )
    .await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

pub async fn get_feedback(
    state: &AppState,
    role: ProfileRole,
    profile_id: DbId,
    id: DbId,
) -> AppResult<Json<Feedback>> {
    Ok(Json(load_feedback(state, role, profile_id, id).await?))
}

/// Leave feedback on a `role` profile as the caller's counterpart profile.
pub async fn create_feedback(
    state: &AppState,
    role: ProfileRole,
    auth: &AuthUser,
    profile_id: DbId,
    input: CreateFeedback,
) -> AppResult<(StatusCode, Json<Feedback>)> {
    let author = require_profile(state, counterpart(role), auth.user_id).await?;
    load_profile(state, role, profile_id).await?;
    validate_feedback_text(&input.text)?;
    validate_rate(input.rate)?;

    let feedback = FeedbackRepo::create(&state.pool, role, profile_id, author.id, &input).await?;
    tracing::info!(feedback_id = %feedback.id, profile_id = %profile_id, "Feedback created");
    Ok((StatusCode::CREATED, Json(feedback)))
}

/// Edit feedback; only its author may.
pub async fn update_feedback(
    state: &AppState,
    role: ProfileRole,
    auth: &AuthUser,
    profile_id: DbId,
    id: DbId,
    input: UpdateFeedback,
) -> AppResult<Json<Feedback>> {
    let feedback = load_feedback(state, role, profile_id, id).await?;
    let author = ProfileRepo::find_by_user(&state.pool, counterpart(role), auth.user_id).await?;
    if author.map(|a| a.id) != Some(feedback.author_id) {
        return Err(forbidden());
    }
    if let Some(text) = &input.text {
        validate_feedback_text(text)?;
    }
    if let Some(rate) = input.rate {
        validate_rate(rate)?;
    }

    let updated = FeedbackRepo::update(&state.pool, role, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: feedback_entity(role),
            id,
        })?;
    Ok(Json(updated))
}

/// Answer feedback; only the owner of the reviewed profile may.
pub async fn answer_feedback(
    state: &AppState,
    role: ProfileRole,
    auth: &AuthUser,
    profile_id: DbId,
    id: DbId,
    input: AnswerFeedback,
) -> AppResult<Json<Feedback>> {
    let profile = load_profile(state, role, profile_id).await?;
    if profile.user_id != auth.user_id {
        return Err(forbidden());
    }
    load_feedback(state, role, profile_id, id).await?;
    validate_feedback_text(&input.answer)?;

    let answered = FeedbackRepo::set_answer(&state.pool, role, id, &input.answer)
        .await?
        .ok_or(CoreError::NotFound {
            entity: feedback_entity(role),
            id,
        })?;
    Ok(Json(answered))
}

/// Remove feedback. Callers are checked for superuser by the route.
pub async fn delete_feedback(
    state: &AppState,
    role: ProfileRole,
    profile_id: DbId,
    id: DbId,
) -> AppResult<StatusCode> {
    load_feedback(state, role, profile_id, id).await?;
    FeedbackRepo::delete(&state.pool, role, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_comes_from_the_other_side() {
        assert_eq!(counterpart(ProfileRole::Client), ProfileRole::Executor);
        assert_eq!(counterpart(ProfileRole::Executor), ProfileRole::Client);
    }

    #[test]
    fn profile_fields_are_checked() {
        assert!(validate_profile_fields(None, Some("+79990001122"), Some("F"), None).is_ok());
        assert!(validate_profile_fields(None, None, Some("X"), None).is_err());
        assert!(validate_profile_fields(Some("not-an-email"), None, None, None).is_err());
    }
}
