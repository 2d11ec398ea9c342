//! Route definitions for the `/order` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::order;
use crate::state::AppState;

/// Routes mounted at `/order`.
///
/// ```text
/// GET    /?status=  -> list_orders
/// POST   /          -> create_order (client profile)
/// GET    /{id}      -> get_order
/// PATCH  /{id}      -> update_order (order's client)
/// DELETE /{id}      -> delete_order (order's client)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(order::list_orders).post(order::create_order))
        .route(
            "/{id}",
            get(order::get_order)
                .patch(order::update_order)
                .delete(order::delete_order),
        )
}
