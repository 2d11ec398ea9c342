pub mod category;
pub mod chat;
pub mod client;
pub mod executor;
pub mod geo;
pub mod health;
pub mod notification;
pub mod order;
pub mod provider;
pub mod storage;
pub mod token;
pub mod transactions;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/users                 register, activation, reset_password
/// /users                      account management, OTP confirmations, 2FA
/// /token                      generate, confirm, refresh, destroy
/// /provider                   OAuth2 redirect and callback
///
/// /category                   categories (admin writes)
/// /sub_category               subcategories (admin writes)
/// /geo                        countries, regions, cities, subway branches, subways
///
/// /client                     client profiles, verification, feedback
/// /executor                   executor profiles, verification, feedback,
///                             experience, services, portfolio, address, geo
/// /order                      orders
/// /chat                       chats, participants, messages
/// /notification               in-app notifications
///
/// /subscription               plans, make
/// /user/transactions          list, refresh
/// /storage                    uploads
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Accounts and sessions.
        .nest("/auth/users", users::auth_router())
        .nest("/users", users::router())
        .nest("/token", token::router())
        .nest("/provider", provider::router())
        // Taxonomies.
        .nest("/category", category::router())
        .nest("/sub_category", category::subcategory_router())
        .nest("/geo", geo::router())
        // Marketplace.
        .nest("/client", client::router())
        .nest("/executor", executor::router())
        .nest("/order", order::router())
        .nest("/chat", chat::router())
        .nest("/notification", notification::router())
        // Payments.
        .nest("/subscription", transactions::subscription_router())
        .nest("/user/transactions", transactions::router())
        // Uploads.
        .nest("/storage", storage::router())
}
