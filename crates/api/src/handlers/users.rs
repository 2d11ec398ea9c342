//! Handlers for account management: registration, activation, password
//! reset, contact changes, two-factor settings and account deletion.
//!
//! Every contact or 2FA change is a two-step flow: the first call issues a
//! one-time code (see [`crate::auth::otp`]) and returns its `token`; the
//! matching `confirm_*` call presents `{token, code}` and applies the change.

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jobbit_core::enums::Type2fa;
use jobbit_core::error::CoreError;
use jobbit_core::types::DbId;
use jobbit_core::validation::{validate_email, validate_password_strength, validate_phone_number};
use jobbit_db::models::user::{CreateUser, User, UserResponse};
use jobbit_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::validate_token;
use crate::auth::otp::{self, OtpPayload};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::tokens::{check_token, make_token, TokenPurpose};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;

pub const EMAIL_TAKEN: &str = "User with given email address already exists";
pub const PHONE_TAKEN: &str = "User with given phone number already exists";
pub const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";
const INVALID_LINK_TOKEN: &str = "Invalid token for given user";
const INVALID_OTP: &str = "Invalid token or code for given user";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/users`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password: String,
    pub re_password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// `{uid, token}` from an activation link.
#[derive(Debug, Deserialize)]
pub struct ActivationRequest {
    pub uid: DbId,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmResetPasswordRequest {
    pub uid: DbId,
    pub token: String,
    pub new_password: String,
}

/// Second step of every OTP flow.
#[derive(Debug, Deserialize)]
pub struct OtpConfirmRequest {
    pub token: String,
    pub code: String,
}

/// `{token}` returned by the first step of every OTP flow.
#[derive(Debug, Serialize)]
pub struct OtpTokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct MeRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct ChangePhoneRequest {
    pub phone_number: String,
}

#[derive(Debug, Serialize)]
pub struct PhoneResponse {
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetEmailRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct EmailResponse {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectMethodRequest {
    pub method: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The 2FA channel stored on `user`.
pub fn current_channel(user: &User) -> Type2fa {
    Type2fa::from_str(&user.type_2fa).unwrap_or(Type2fa::Email)
}

fn link_token(state: &AppState, purpose: TokenPurpose, user: &User) -> AppResult<String> {
    make_token(&state.config.jwt.secret, purpose, user)
        .map_err(|e| AppError::InternalError(format!("Link token error: {e}")))
}

fn password_hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::InternalError(format!("Hashing error: {e}")))
}

fn password_matches(password: &str, user: &User) -> AppResult<bool> {
    verify_password(password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))
}

/// Issue an OTP for `payload` and return its token.
pub(crate) async fn issue_otp(state: &AppState, payload: OtpPayload) -> AppResult<(String, String)> {
    Ok(otp::issue(&state.pool, &state.config.jwt, &state.config.otp, payload).await?)
}

/// Verify `{token, code}` and require it to belong to the caller.
async fn verify_own_otp(
    state: &AppState,
    auth: &AuthUser,
    input: &OtpConfirmRequest,
) -> AppResult<OtpPayload> {
    let payload = otp::verify(
        &state.pool,
        &state.config.jwt,
        &state.config.otp,
        &input.token,
        &input.code,
    )
    .await?;
    if payload.user_id != auth.user_id {
        return Err(AppError::Detail(INVALID_OTP.into()));
    }
    Ok(payload)
}

async fn find_user_for_link(state: &AppState, uid: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, uid)
        .await?
        .ok_or_else(|| AppError::Detail(INVALID_LINK_TOKEN.into()))
}

// ---------------------------------------------------------------------------
// Registration and activation
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/users
///
/// Register by phone number or email. The account stays inactive until the
/// activation link sent to the given contact is followed.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    if input.password != input.re_password {
        return Err(AppError::Detail("The two password fields didn't match.".into()));
    }
    validate_password_strength(&input.password)?;

    let phone_number = input.phone_number.filter(|p| !p.is_empty());
    let email = input.email.filter(|e| !e.is_empty());

    let (create, channel) = match (phone_number, email) {
        (Some(phone), _) => {
            validate_phone_number(&phone)?;
            if UserRepo::phone_number_exists(&state.pool, &phone).await? {
                return Err(AppError::Detail(PHONE_TAKEN.into()));
            }
            (
                CreateUser {
                    email: None,
                    phone_number: Some(phone),
                    password_hash: password_hash(&input.password)?,
                    is_active: false,
                    type_2fa: Type2fa::Phone.as_str().into(),
                },
                Type2fa::Phone,
            )
        }
        (None, Some(email)) => {
            validate_email(&email)?;
            if UserRepo::email_exists(&state.pool, &email).await? {
                return Err(AppError::Detail(EMAIL_TAKEN.into()));
            }
            (
                CreateUser {
                    email: Some(email),
                    phone_number: None,
                    password_hash: password_hash(&input.password)?,
                    is_active: false,
                    type_2fa: Type2fa::Email.as_str().into(),
                },
                Type2fa::Email,
            )
        }
        (None, None) => {
            return Err(AppError::Detail("Need to provide email or phone number".into()));
        }
    };

    let user = UserRepo::create(&state.pool, &create).await?;
    let token = link_token(&state, TokenPurpose::Activation, &user)?;
    let link = state
        .config
        .frontend
        .link(&format!("/activate/{}/{token}", user.id));

    match (channel, &user.phone_number, &user.email) {
        (Type2fa::Phone, Some(phone), _) => {
            state
                .messenger
                .send_sms(phone, &format!("Activate your account: {link}"))
                .await;
        }
        (_, _, Some(email)) => {
            state
                .messenger
                .send_email(
                    email,
                    "Account activation",
                    &format!("Follow the link to activate your account:\n{link}"),
                )
                .await;
        }
        _ => {}
    }

    tracing::info!(user_id = %user.id, channel = %channel, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            email: user.email,
            phone_number: user.phone_number,
        }),
    ))
}

/// POST /api/v1/auth/users/activation
pub async fn activation(
    State(state): State<AppState>,
    Json(input): Json<ActivationRequest>,
) -> AppResult<StatusCode> {
    let user = find_user_for_link(&state, input.uid).await?;
    if user.is_active
        || !check_token(
            &state.config.jwt.secret,
            TokenPurpose::Activation,
            &user,
            &input.token,
        )
    {
        return Err(AppError::Detail(INVALID_LINK_TOKEN.into()));
    }

    UserRepo::activate(&state.pool, user.id).await?;
    tracing::info!(user_id = %user.id, "User activated");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/users/reset_password
///
/// Send a reset link through the user's 2FA channel. Unknown contacts are
/// answered the same way as known ones.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    let user = match (
        input.email.as_deref().filter(|e| !e.is_empty()),
        input.phone_number.as_deref().filter(|p| !p.is_empty()),
    ) {
        (Some(email), _) => UserRepo::find_by_email(&state.pool, email).await?,
        (None, Some(phone)) => UserRepo::find_by_phone_number(&state.pool, phone).await?,
        (None, None) => {
            return Err(AppError::Detail("Need to provide email or phone number".into()));
        }
    };
    let Some(user) = user else {
        return Ok(StatusCode::NO_CONTENT);
    };

    let token = link_token(&state, TokenPurpose::PasswordReset, &user)?;
    let link = state
        .config
        .frontend
        .link(&format!("/password/reset/confirm/{}/{token}", user.id));

    match (current_channel(&user), &user.email, &user.phone_number) {
        (Type2fa::Email, Some(email), _) => {
            state
                .messenger
                .send_email(
                    email,
                    "Password reset",
                    &format!("Follow the link to set a new password:\n{link}"),
                )
                .await;
        }
        (_, _, Some(phone)) => {
            state
                .messenger
                .send_sms(phone, &format!("Reset your password: {link}"))
                .await;
        }
        (_, Some(email), None) => {
            state
                .messenger
                .send_email(
                    email,
                    "Password reset",
                    &format!("Follow the link to set a new password:\n{link}"),
                )
                .await;
        }
        (_, None, None) => {}
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/users/confirm_reset_password
///
/// Set a new password and revoke every session of the user.
pub async fn confirm_reset_password(
    State(state): State<AppState>,
    Json(input): Json<ConfirmResetPasswordRequest>,
) -> AppResult<StatusCode> {
    let user = find_user_for_link(&state, input.uid).await?;
    if !check_token(
        &state.config.jwt.secret,
        TokenPurpose::PasswordReset,
        &user,
        &input.token,
    ) {
        return Err(AppError::Detail(INVALID_LINK_TOKEN.into()));
    }
    validate_password_strength(&input.new_password)?;

    UserRepo::update_password(&state.pool, user.id, &password_hash(&input.new_password)?).await?;
    let revoked = SessionRepo::delete_all_for_user(&state.pool, user.id).await?;
    UserRepo::touch_last_login(&state.pool, user.id).await?;

    tracing::info!(user_id = %user.id, revoked, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// User records
// ---------------------------------------------------------------------------

/// GET /api/v1/users/{id}
pub async fn get_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_public_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;
    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound { entity: "User", id }.into());
    }
    tracing::info!(user_id = %id, by = %auth.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/users/me
///
/// Resolve the user id of an access token.
pub async fn me(
    State(state): State<AppState>,
    Json(input): Json<MeRequest>,
) -> AppResult<Json<MeResponse>> {
    let claims = validate_token(&input.token, &state.config.jwt)
        .map_err(|_| AppError::Detail("Token is invalid or expired".into()))?;
    Ok(Json(MeResponse {
        user_id: claims.sub,
    }))
}

/// GET /api/v1/users/profile
pub async fn profile(auth: AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(&auth.user))
}

// ---------------------------------------------------------------------------
// Contact changes
// ---------------------------------------------------------------------------

/// POST /api/v1/users/change_phone_number
pub async fn change_phone_number(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ChangePhoneRequest>,
) -> AppResult<Json<OtpTokenResponse>> {
    validate_phone_number(&input.phone_number)?;
    if UserRepo::phone_number_exists(&state.pool, &input.phone_number).await? {
        return Err(AppError::Detail(PHONE_TAKEN.into()));
    }

    let (token, code) = issue_otp(
        &state,
        OtpPayload {
            user_id: auth.user_id,
            phone_number: Some(input.phone_number.clone()),
            ..Default::default()
        },
    )
    .await?;
    state
        .messenger
        .send_sms(
            &input.phone_number,
            &format!("Your verification code: {code}"),
        )
        .await;

    Ok(Json(OtpTokenResponse { token }))
}

/// POST /api/v1/users/confirm_change_phone
pub async fn confirm_change_phone(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<OtpConfirmRequest>,
) -> AppResult<Json<PhoneResponse>> {
    let payload = verify_own_otp(&state, &auth, &input).await?;
    let phone_number = payload
        .phone_number
        .ok_or_else(|| AppError::Detail(INVALID_OTP.into()))?;

    let user = UserRepo::update_phone_number(&state.pool, auth.user_id, &phone_number).await?;
    tracing::info!(user_id = %user.id, "Phone number changed");
    Ok(Json(PhoneResponse { phone_number }))
}

/// POST /api/v1/users/reset_email
pub async fn reset_email(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ResetEmailRequest>,
) -> AppResult<Json<OtpTokenResponse>> {
    validate_email(&input.email)?;
    if UserRepo::email_exists(&state.pool, &input.email).await? {
        return Err(AppError::Detail(EMAIL_TAKEN.into()));
    }

    let (token, code) = issue_otp(
        &state,
        OtpPayload {
            user_id: auth.user_id,
            email: Some(input.email.clone()),
            ..Default::default()
        },
    )
    .await?;
    state
        .messenger
        .send_email(
            &input.email,
            "Email confirmation",
            &format!("Your verification code: {code}"),
        )
        .await;

    Ok(Json(OtpTokenResponse { token }))
}

/// POST /api/v1/users/confirm_reset_email
pub async fn confirm_reset_email(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<OtpConfirmRequest>,
) -> AppResult<Json<EmailResponse>> {
    let payload = verify_own_otp(&state, &auth, &input).await?;
    let email = payload
        .email
        .ok_or_else(|| AppError::Detail(INVALID_OTP.into()))?;

    UserRepo::update_email(&state.pool, auth.user_id, &email).await?;
    tracing::info!(user_id = %auth.user_id, "Email changed");
    Ok(Json(EmailResponse { email }))
}

// ---------------------------------------------------------------------------
// Account deletion
// ---------------------------------------------------------------------------

/// POST /api/v1/users/delete_user_account
///
/// With confirmation enabled this answers `{token}` and the deletion happens
/// in `confirm_delete_user_account`; otherwise the account is deleted now.
pub async fn delete_user_account(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<DeleteAccountRequest>,
) -> AppResult<Response> {
    if !password_matches(&input.password, &auth.user)? {
        return Err(AppError::Detail(INVALID_CREDENTIALS.into()));
    }

    if !state.config.send_delete_confirmation {
        UserRepo::delete(&state.pool, auth.user_id).await?;
        tracing::info!(user_id = %auth.user_id, "Account deleted");
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let (token, code) = issue_otp(
        &state,
        OtpPayload {
            user_id: auth.user_id,
            ..Default::default()
        },
    )
    .await?;
    state
        .messenger
        .send_code(&auth.user, current_channel(&auth.user), &code)
        .await;

    Ok(Json(OtpTokenResponse { token }).into_response())
}

/// POST /api/v1/users/confirm_delete_user_account
pub async fn confirm_delete_user_account(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<OtpConfirmRequest>,
) -> AppResult<StatusCode> {
    verify_own_otp(&state, &auth, &input).await?;
    UserRepo::delete(&state.pool, auth.user_id).await?;
    tracing::info!(user_id = %auth.user_id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Two-factor settings
// ---------------------------------------------------------------------------

/// POST /api/v1/users/switch_2fa
pub async fn switch_2fa(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<OtpTokenResponse>> {
    let (token, code) = issue_otp(
        &state,
        OtpPayload {
            user_id: auth.user_id,
            ..Default::default()
        },
    )
    .await?;
    state
        .messenger
        .send_code(&auth.user, current_channel(&auth.user), &code)
        .await;
    Ok(Json(OtpTokenResponse { token }))
}

/// POST /api/v1/users/confirm_switch_2fa
pub async fn confirm_switch_2fa(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<OtpConfirmRequest>,
) -> AppResult<StatusCode> {
    verify_own_otp(&state, &auth, &input).await?;
    let user = UserRepo::toggle_2fa(&state.pool, auth.user_id).await?;
    tracing::info!(user_id = %user.id, enabled = user.is_2fa_enabled, "2FA switched");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/users/select_2fa_method
///
/// Send a code through the chosen channel to prove the caller controls it.
pub async fn select_2fa_method(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SelectMethodRequest>,
) -> AppResult<Json<OtpTokenResponse>> {
    let method = Type2fa::from_str(&input.method)?;
    match method {
        Type2fa::Phone if auth.user.phone_number.is_none() => {
            return Err(AppError::Detail("User has not phone number".into()));
        }
        Type2fa::Email if auth.user.email.is_none() => {
            return Err(AppError::Detail("User has not email".into()));
        }
        _ => {}
    }

    let (token, code) = issue_otp(
        &state,
        OtpPayload {
            user_id: auth.user_id,
            method: Some(method.as_str().into()),
            ..Default::default()
        },
    )
    .await?;
    state.messenger.send_code(&auth.user, method, &code).await;
    Ok(Json(OtpTokenResponse { token }))
}

/// POST /api/v1/users/confirm_select_2fa_method
pub async fn confirm_select_2fa_method(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<OtpConfirmRequest>,
) -> AppResult<StatusCode> {
    let payload = verify_own_otp(&state, &auth, &input).await?;
    let method = payload
        .method
        .as_deref()
        .and_then(|m| Type2fa::from_str(m).ok())
        .ok_or_else(|| AppError::Detail(INVALID_OTP.into()))?;

    UserRepo::set_type_2fa(&state.pool, auth.user_id, method.as_str()).await?;
    Ok(StatusCode::NO_CONTENT)
}
