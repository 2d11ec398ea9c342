//! Route definitions for uploads.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::storage::{self, MAX_UPLOAD_SIZE};
use crate::state::AppState;

/// Routes mounted at `/storage`.
///
/// ```text
/// POST /  -> upload (multipart, auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(storage::upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
}
