//! Route definitions for client profiles.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::client;
use crate::state::AppState;

/// Routes mounted at `/client`.
///
/// ```text
/// GET, POST           /profile                          -> list_profiles, create_profile
/// GET, PATCH, DELETE  /profile/{id}                     -> get_profile, update_profile, delete_profile
/// POST                /verification                     -> create_verification
/// GET, POST           /{client_id}/feedback             -> list_feedback, create_feedback
/// GET, PATCH, DELETE  /{client_id}/feedback/{id}        -> get_feedback, update_feedback, delete_feedback
/// POST                /{client_id}/feedback/{id}/answer -> answer_feedback
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(client::list_profiles).post(client::create_profile),
        )
        .route(
            "/profile/{id}",
            get(client::get_profile)
                .patch(client::update_profile)
                .delete(client::delete_profile),
        )
        .route("/verification", post(client::create_verification))
        .route(
            "/{client_id}/feedback",
            get(client::list_feedback).post(client::create_feedback),
        )
        .route(
            "/{client_id}/feedback/{id}",
            get(client::get_feedback)
                .patch(client::update_feedback)
                .delete(client::delete_feedback),
        )
        .route(
            "/{client_id}/feedback/{id}/answer",
            post(client::answer_feedback),
        )
}
