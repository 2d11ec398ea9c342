//! Server-side sessions.
//!
//! Every issued access token is bound to a `user_sessions` row keyed by
//! `sha256_hex(access_token + user_id)`. A token whose session row is gone is
//! rejected even when its signature and expiry are still valid, which is how
//! logout and password resets revoke outstanding tokens.

use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jobbit_core::error::CoreError;
use jobbit_core::types::DbId;
use jobbit_db::models::session::CreateSession;
use jobbit_db::repositories::{SessionRepo, UserRepo};
use serde::Serialize;

use crate::auth::jwt::{
    generate_access_token, generate_refresh_token, hash_refresh_token, sha256_hex,
};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// `{refresh, access}` pair returned by every login flow.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// Request metadata recorded on the session row.
#[derive(Debug, Default, Clone)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientMeta {
    /// Read the client address and agent from proxy-style request headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let ip_address = header("x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
            .or_else(|| header("x-real-ip"));
        Self {
            ip_address,
            user_agent: header("user-agent"),
        }
    }
}

/// Key of the session an access token belongs to.
pub fn session_key(access_token: &str, user_id: DbId) -> String {
    sha256_hex(&format!("{access_token}{user_id}"))
}

fn access_token(state: &AppState, user_id: DbId) -> AppResult<String> {
    generate_access_token(user_id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))
}

/// Issue a token pair for `user_id`, record its session and stamp the login.
pub async fn open_session(
    state: &AppState,
    user_id: DbId,
    meta: ClientMeta,
) -> AppResult<TokenPair> {
    let access = access_token(state, user_id)?;
    let (refresh, refresh_hash) = generate_refresh_token();
    let expires_at = Utc::now() + Duration::days(state.config.jwt.refresh_token_expiry_days);

    let input = CreateSession {
        user_id,
        session_key: session_key(&access, user_id),
        refresh_token_hash: refresh_hash,
        ip_address: meta.ip_address,
        user_agent: meta.user_agent,
        expires_at,
    };
    SessionRepo::create(&state.pool, &input).await?;
    UserRepo::touch_last_login(&state.pool, user_id).await?;

    tracing::info!(user_id = %user_id, "Session opened");
    Ok(TokenPair { refresh, access })
}

/// Issue a new access token for the session holding `refresh`.
///
/// The refresh token itself is kept; only the session key moves to the new
/// access token, so the previous access token stops authenticating.
pub async fn refresh_session(state: &AppState, refresh: &str) -> AppResult<TokenPair> {
    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &hash_refresh_token(refresh))
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Token is invalid or expired".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id).await?;
    if !user.is_some_and(|u| u.is_active) {
        return Err(AppError::Core(CoreError::Unauthorized(
            "User is inactive or deleted".into(),
        )));
    }

    let access = access_token(state, session.user_id)?;
    SessionRepo::rebind(
        &state.pool,
        session.id,
        &session_key(&access, session.user_id),
        session.expires_at,
    )
    .await?;

    Ok(TokenPair {
        refresh: refresh.to_string(),
        access,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn session_key_depends_on_token_and_user() {
        let user = Uuid::new_v4();
        let key = session_key("token", user);
        assert_eq!(key.len(), 64);
        assert_eq!(key, sha256_hex(&format!("token{user}")));
        assert_ne!(key, session_key("token", Uuid::new_v4()));
        assert_ne!(key, session_key("other", user));
    }

    #[test]
    fn client_meta_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.0.1"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8"));

        let meta = ClientMeta::from_headers(&headers);
        assert_eq!(meta.ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(meta.user_agent.as_deref(), Some("curl/8"));
    }

    #[test]
    fn client_meta_without_headers() {
        let meta = ClientMeta::from_headers(&HeaderMap::new());
        assert!(meta.ip_address.is_none());
        assert!(meta.user_agent.is_none());
    }
}
