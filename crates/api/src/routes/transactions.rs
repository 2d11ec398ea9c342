//! Route definitions for subscriptions and transactions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::transactions;
use crate::state::AppState;

/// Routes mounted at `/subscription`.
///
/// ```text
/// GET  /plans?currency=  -> plans (public)
/// POST /make             -> make
/// ```
pub fn subscription_router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(transactions::plans))
        .route("/make", post(transactions::make))
}

/// Routes mounted at `/user/transactions`.
///
/// ```text
/// GET  /?role=         -> list_transactions
/// POST /{id}/refresh   -> refresh
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(transactions::list_transactions))
        .route("/{id}/refresh", post(transactions::refresh))
}
