//! Route definitions for OAuth2 sign-in.

use axum::routing::get;
use axum::Router;

use crate::handlers::oauth;
use crate::state::AppState;

/// Routes mounted at `/provider`.
///
/// ```text
/// GET /auth?method=   -> authorize
/// GET /{name}?code=   -> callback
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth", get(oauth::authorize))
        .route("/{name}", get(oauth::callback))
}
