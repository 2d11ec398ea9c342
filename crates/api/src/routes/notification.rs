//! Route definitions for the `/notification` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notification`. All require auth.
///
/// ```text
/// GET  /           -> list_notifications
/// POST /read       -> read
/// POST /read_all   -> read_all
/// GET  /check      -> check
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list_notifications))
        .route("/read", post(notification::read))
        .route("/read_all", post(notification::read_all))
        .route("/check", get(notification::check))
}
