//! Session-bound JWT authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jobbit_core::error::CoreError;
use jobbit_core::types::DbId;
use jobbit_db::models::user::User;
use jobbit_db::repositories::{SessionRepo, UserRepo};

use crate::auth::jwt::validate_token;
use crate::auth::session::session_key;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller extracted from the `Authorization` header.
///
/// The header carries `Bearer <access>` (or `JWT <access>`). A token is only
/// accepted while its session row exists and the user is active.
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %auth.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub user: User,
    /// Key of the session the token is bound to.
    pub session_key: String,
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}

/// Strip the scheme from an `Authorization` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("JWT "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Authentication credentials were not provided."))?;

        let token = bearer_token(auth_header).ok_or_else(|| {
            unauthorized("Invalid Authorization format. Expected: Bearer <token>")
        })?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Given token not valid for any token type"))?;

        let key = session_key(token, claims.sub);
        if SessionRepo::find_by_session_key(&state.pool, &key)
            .await?
            .is_none()
        {
            return Err(unauthorized("Session expired or revoked"));
        }

        let user = UserRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| unauthorized("User is inactive or deleted"))?;

        Ok(AuthUser {
            user_id: user.id,
            user,
            session_key: key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bearer_and_jwt_schemes() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("JWT abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }
}
