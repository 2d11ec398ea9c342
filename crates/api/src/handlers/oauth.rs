//! OAuth2 sign-in handlers.
//!
//! `GET /provider/auth?method=` sends the browser to the provider; the
//! provider redirects back to `GET /provider/{name}?code=`, which signs the
//! user in and forwards the token pair to the frontend.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Redirect;
use jobbit_core::enums::Type2fa;
use jobbit_db::models::user::CreateUser;
use jobbit_db::repositories::UserRepo;
use serde::Deserialize;

use crate::auth::password::{hash_password, random_password};
use crate::auth::session::{open_session, ClientMeta};
use crate::error::{AppError, AppResult};
use crate::oauth::OAuthProvider;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuthParams {
    pub method: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

fn provider(state: &AppState, name: &str) -> AppResult<Arc<dyn OAuthProvider>> {
    state
        .oauth
        .get(name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown auth provider '{name}'")))
}

/// GET /api/v1/provider/auth?method=vk|google|yandex
pub async fn authorize(
    State(state): State<AppState>,
    Query(params): Query<AuthParams>,
) -> AppResult<Redirect> {
    let method = params
        .method
        .ok_or_else(|| AppError::Detail("Arg `method` is required".into()))?;
    let provider = provider(&state, &method)?;
    Ok(Redirect::temporary(&provider.authorization_url()))
}

/// GET /api/v1/provider/{name}?code=
///
/// Find or create an active account for the provider email, open a session
/// and redirect to the frontend with the tokens in the query string.
pub async fn callback(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> AppResult<Redirect> {
    let provider = provider(&state, &name)?;
    let code = params
        .code
        .ok_or_else(|| AppError::Detail("Arg `code` is required".into()))?;

    let email = provider.email_for_code(&code).await.map_err(|e| {
        tracing::warn!(provider = provider.name(), error = %e, "OAuth exchange failed");
        AppError::Detail("Failed to authenticate with provider".into())
    })?;

    let user = match UserRepo::find_by_email(&state.pool, &email).await? {
        Some(user) => user,
        None => {
            let password_hash = hash_password(&random_password())
                .map_err(|e| AppError::InternalError(format!("Hashing error: {e}")))?;
            let user = UserRepo::create(
                &state.pool,
                &CreateUser {
                    email: Some(email),
                    phone_number: None,
                    password_hash,
                    is_active: true,
                    type_2fa: Type2fa::Email.as_str().into(),
                },
            )
            .await?;
            tracing::info!(user_id = %user.id, provider = provider.name(), "User created via OAuth");
            user
        }
    };
    if !user.is_active {
        return Err(AppError::Detail("User account is disabled".into()));
    }

    let pair = open_session(&state, user.id, ClientMeta::from_headers(&headers)).await?;
    let target = state.config.frontend.link(&format!(
        "/auth/provider?refresh={}&access={}",
        pair.refresh, pair.access
    ));
    Ok(Redirect::temporary(&target))
}
