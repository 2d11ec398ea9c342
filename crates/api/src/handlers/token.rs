//! Handlers for the `/token` resource: login, OTP confirmation, refresh
//! and logout.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use jobbit_core::error::CoreError;
use jobbit_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::otp::{self, OtpPayload};
use crate::auth::password::verify_password;
use crate::auth::session::{open_session, refresh_session, ClientMeta, TokenPair};
use crate::error::{AppError, AppResult};
use crate::handlers::users::{current_channel, issue_otp, OtpConfirmRequest, INVALID_CREDENTIALS};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /token/generate`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password: String,
}

/// Either a session or, with 2FA on, the token of the pending OTP.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LoginResponse {
    Challenge { token: String },
    Tokens(TokenPair),
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/token/generate
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = match (
        input.email.as_deref().filter(|e| !e.is_empty()),
        input.phone_number.as_deref().filter(|p| !p.is_empty()),
    ) {
        (Some(email), _) => UserRepo::find_by_email(&state.pool, email).await?,
        (None, Some(phone)) => UserRepo::find_by_phone_number(&state.pool, phone).await?,
        (None, None) => None,
    }
    .ok_or_else(invalid_credentials)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid || !user.is_active {
        return Err(invalid_credentials());
    }

    if user.is_2fa_enabled && user.phone_number.is_some() {
        let (token, code) = issue_otp(
            &state,
            OtpPayload {
                user_id: user.id,
                phone_number: user.phone_number.clone(),
                ..Default::default()
            },
        )
        .await?;
        state
            .messenger
            .send_code(&user, current_channel(&user), &code)
            .await;
        tracing::info!(user_id = %user.id, "Login awaiting OTP");
        return Ok(Json(LoginResponse::Challenge { token }));
    }

    let pair = open_session(&state, user.id, ClientMeta::from_headers(&headers)).await?;
    Ok(Json(LoginResponse::Tokens(pair)))
}

/// POST /api/v1/token/confirm
pub async fn confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<OtpConfirmRequest>,
) -> AppResult<Json<TokenPair>> {
    let payload = otp::verify(
        &state.pool,
        &state.config.jwt,
        &state.config.otp,
        &input.token,
        &input.code,
    )
    .await?;
    let user = UserRepo::find_by_id(&state.pool, payload.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(invalid_credentials)?;

    let pair = open_session(&state, user.id, ClientMeta::from_headers(&headers)).await?;
    Ok(Json(pair))
}

/// POST /api/v1/token/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    Ok(Json(refresh_session(&state, &input.refresh).await?))
}

/// POST /api/v1/token/destroy
///
/// End the session of the presented access token.
pub async fn destroy(auth: AuthUser, State(state): State<AppState>) -> AppResult<StatusCode> {
    SessionRepo::delete_by_session_key(&state.pool, &auth.session_key).await?;
    tracing::info!(user_id = %auth.user_id, "Session destroyed");
    Ok(StatusCode::NO_CONTENT)
}
