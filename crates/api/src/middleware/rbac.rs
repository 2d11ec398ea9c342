//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects callers without the
//! required account flags with 403 Forbidden.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jobbit_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a superuser.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(auth): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        if !auth.user.is_superuser {
            return Err(AppError::Core(CoreError::Forbidden(
                "You do not have permission to perform this action.".into(),
            )));
        }
        Ok(RequireAdmin(auth))
    }
}

/// Requires a staff member or a superuser.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        if !auth.user.is_staff_or_superuser() {
            return Err(AppError::Core(CoreError::Forbidden(
                "You do not have permission to perform this action.".into(),
            )));
        }
        Ok(RequireStaff(auth))
    }
}
