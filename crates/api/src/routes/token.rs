//! Route definitions for the `/token` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::token;
use crate::state::AppState;

/// Routes mounted at `/token`.
///
/// ```text
/// POST /generate  -> generate
/// POST /confirm   -> confirm
/// POST /refresh   -> refresh
/// POST /destroy   -> destroy (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(token::generate))
        .route("/confirm", post(token::confirm))
        .route("/refresh", post(token::refresh))
        .route("/destroy", post(token::destroy))
}
