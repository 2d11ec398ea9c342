//! Route definitions for accounts.
//!
//! Registration lives under `/auth/users`; everything done to an existing
//! account lives under `/users`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/auth/users`.
///
/// ```text
/// POST /                 -> register
/// POST /activation       -> activation
/// POST /reset_password   -> reset_password
/// ```
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/", post(users::register))
        .route("/activation", post(users::activation))
        .route("/reset_password", post(users::reset_password))
}

/// Routes mounted at `/users`.
///
/// ```text
/// POST   /confirm_reset_password       -> confirm_reset_password
/// POST   /me                           -> me
/// GET    /profile                      -> profile (auth)
/// POST   /change_phone_number          -> change_phone_number (auth)
/// POST   /confirm_change_phone         -> confirm_change_phone (auth)
/// POST   /reset_email                  -> reset_email (auth)
/// POST   /confirm_reset_email          -> confirm_reset_email (auth)
/// POST   /delete_user_account          -> delete_user_account (auth)
/// POST   /confirm_delete_user_account  -> confirm_delete_user_account (auth)
/// POST   /switch_2fa                   -> switch_2fa (auth)
/// POST   /confirm_switch_2fa           -> confirm_switch_2fa (auth)
/// POST   /select_2fa_method            -> select_2fa_method (auth)
/// POST   /confirm_select_2fa_method    -> confirm_select_2fa_method (auth)
/// GET    /{id}                         -> get_user (auth)
/// DELETE /{id}                         -> delete_user (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/confirm_reset_password", post(users::confirm_reset_password))
        .route("/me", post(users::me))
        .route("/profile", get(users::profile))
        .route("/change_phone_number", post(users::change_phone_number))
        .route("/confirm_change_phone", post(users::confirm_change_phone))
        .route("/reset_email", post(users::reset_email))
        .route("/confirm_reset_email", post(users::confirm_reset_email))
        .route("/delete_user_account", post(users::delete_user_account))
        .route(
            "/confirm_delete_user_account",
            post(users::confirm_delete_user_account),
        )
        .route("/switch_2fa", post(users::switch_2fa))
        .route("/confirm_switch_2fa", post(users::confirm_switch_2fa))
        .route("/select_2fa_method", post(users::select_2fa_method))
        .route(
            "/confirm_select_2fa_method",
            post(users::confirm_select_2fa_method),
        )
        .route("/{id}", get(users::get_user).delete(users::delete_user))
}
