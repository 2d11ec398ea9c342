//! Route definitions for the `/chat` resource.

use axum::routing::{delete, get, patch};
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// Routes mounted at `/chat`.
///
/// ```text
/// GET    /?role=                               -> list_chats
/// POST   /                                     -> create_chat
/// GET    /get_updates?role=                    -> get_updates
/// GET    /{id}                                 -> get_chat
/// GET    /{id}/participant?role=               -> list_participants
/// POST   /{id}/participant                     -> add_participant (admin)
/// DELETE /{id}/participant/{participant_id}    -> remove_participant (admin)
/// GET    /{id}/message                         -> list_messages
/// POST   /{id}/message?role=                   -> create_message
/// PATCH  /{id}/message/{message_id}?role=      -> update_message
/// DELETE /{id}/message/{message_id}            -> delete_message
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(chat::list_chats).post(chat::create_chat))
        .route("/get_updates", get(chat::get_updates))
        .route("/{id}", get(chat::get_chat))
        .route(
            "/{id}/participant",
            get(chat::list_participants).post(chat::add_participant),
        )
        .route(
            "/{id}/participant/{participant_id}",
            delete(chat::remove_participant),
        )
        .route(
            "/{id}/message",
            get(chat::list_messages).post(chat::create_message),
        )
        .route(
            "/{id}/message/{message_id}",
            patch(chat::update_message).delete(chat::delete_message),
        )
}
