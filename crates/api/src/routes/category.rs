//! Route definitions for categories and subcategories.

use axum::routing::get;
use axum::Router;

use crate::handlers::category;
use crate::state::AppState;

/// Routes mounted at `/category`.
///
/// ```text
/// GET    /      -> list_categories
/// POST   /      -> create_category (admin)
/// GET    /{id}  -> get_category
/// PATCH  /{id}  -> update_category (admin)
/// DELETE /{id}  -> delete_category (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(category::list_categories).post(category::create_category),
        )
        .route(
            "/{id}",
            get(category::get_category)
                .patch(category::update_category)
                .delete(category::delete_category),
        )
}

/// Routes mounted at `/sub_category`.
///
/// ```text
/// GET    /      -> list_subcategories
/// POST   /      -> create_subcategory (admin)
/// GET    /{id}  -> get_subcategory
/// PATCH  /{id}  -> update_subcategory (admin)
/// DELETE /{id}  -> delete_subcategory (admin)
/// ```
pub fn subcategory_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(category::list_subcategories).post(category::create_subcategory),
        )
        .route(
            "/{id}",
            get(category::get_subcategory)
                .patch(category::update_subcategory)
                .delete(category::delete_subcategory),
        )
}
