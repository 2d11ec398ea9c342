//! Handlers for the `/chat` resource: chats, their participants and
//! messages.
//!
//! Most operations take a `?role=` argument naming the side the caller acts
//! on. The caller must own the matching profile; moderators are added by
//! administrators and never act through these endpoints.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use jobbit_core::enums::{ParticipantRole, ProfileRole};
use jobbit_core::error::CoreError;
use jobbit_core::pagination::{
    CHAT_HISTORY_PAGE_SIZE, CHAT_PAGE_SIZE, CHAT_PARTICIPANTS_PAGE_SIZE,
};
use jobbit_core::types::DbId;
use jobbit_core::validation::{validate_max_len, validate_required};
use jobbit_db::models::chat::{
    Chat, ChatFile, CreateChat, CreateChatFile, CreateMessage, Message, Participant,
    UpdateMessage,
};
use jobbit_db::models::notification::CreateNotification;
use jobbit_db::models::order::Order;
use jobbit_db::repositories::{
    ChatFileRepo, ChatRepo, MessageRepo, NotificationRepo, OrderRepo, ParticipantRepo,
    ProfileRepo, UserRepo,
};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};

use crate::error::{AppError, AppResult};
use crate::handlers::profile::forbidden;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{
    ensure_page, require_participant_role, PageParams, RoleParams, NO_PROFILE_FOR_ROLE,
};
use crate::response::{CountResponse, Paginated};
use crate::state::AppState;

pub const CHAT_EXISTS: &str = "Chat for this response is already exists";
pub const INSUFFICIENT_BALANCE: &str = "You have insufficient balance for response";

const MAX_CHAT_TITLE_LEN: usize = 512;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    pub title: String,
    pub cover: Option<String>,
    pub role: Option<String>,
    pub order_id: DbId,
    pub executor: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct AddParticipantRequest {
    pub email: String,
}

/// `?role=` for message writes.
#[derive(Debug, Deserialize)]
pub struct MessageRoleParams {
    pub role: Option<String>,
}

/// A message with its attached files.
#[derive(Debug, Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    pub files: Vec<ChatFile>,
}

/// A chat with everything a chat list row shows.
#[derive(Debug, Serialize)]
pub struct ChatView {
    #[serde(flatten)]
    pub chat: Chat,
    pub participants: Vec<Participant>,
    pub order: Option<Order>,
    pub last_message: Option<MessageView>,
    pub unreaded_message: i64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse `?role=` and check the caller owns the profile acting in it.
async fn caller_role(
    state: &AppState,
    auth: &AuthUser,
    raw: Option<&str>,
) -> AppResult<ParticipantRole> {
    let role = require_participant_role(raw)?;
    let has_profile = match role.profile_role() {
        Some(profile_role) => {
            ProfileRepo::exists_for_user(&state.pool, profile_role, auth.user_id).await?
        }
        None => false,
    };
    if !has_profile {
        return Err(AppError::Detail(NO_PROFILE_FOR_ROLE.into()));
    }
    Ok(role)
}

async fn load_chat(state: &AppState, id: DbId) -> AppResult<Chat> {
    ChatRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Chat", id }.into())
}

/// The caller's membership in `chat_id`, optionally in one role, or 403.
async fn require_member(
    state: &AppState,
    auth: &AuthUser,
    chat_id: DbId,
    role: Option<ParticipantRole>,
) -> AppResult<Participant> {
    ParticipantRepo::find_member(
        &state.pool,
        chat_id,
        auth.user_id,
        role.map(|r| r.as_str()),
    )
    .await?
    .ok_or_else(forbidden)
}

async fn load_message(state: &AppState, chat_id: DbId, id: DbId) -> AppResult<Message> {
    MessageRepo::find(&state.pool, chat_id, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Message", id }.into())
}

async fn with_files(state: &AppState, messages: Vec<Message>) -> AppResult<Vec<MessageView>> {
    let ids: Vec<DbId> = messages.iter().map(|m| m.id).collect();
    let mut files: HashMap<DbId, Vec<ChatFile>> = HashMap::new();
    for row in ChatFileRepo::list_for_messages(&state.pool, &ids).await? {
        files.entry(row.message_id).or_default().push(row.file);
    }
    Ok(messages
        .into_iter()
        .map(|message| MessageView {
            files: files.remove(&message.id).unwrap_or_default(),
            message,
        })
        .collect())
}

async fn message_view(state: &AppState, message: Message) -> AppResult<MessageView> {
    let mut views = with_files(state, vec![message]).await?;
    views
        .pop()
        .ok_or_else(|| AppError::InternalError("message view went missing".into()))
}

async fn chat_views(state: &AppState, auth: &AuthUser, chats: Vec<Chat>) -> AppResult<Vec<ChatView>> {
    let ids: Vec<DbId> = chats.iter().map(|c| c.id).collect();
    let mut members: HashMap<DbId, Vec<Participant>> = HashMap::new();
    for (chat_id, participant) in ParticipantRepo::list_members_for_chats(&state.pool, &ids).await? {
        members.entry(chat_id).or_default().push(participant);
    }

    let mut views = Vec::with_capacity(chats.len());
    for chat in chats {
        let order = match chat.associated_order_id {
            Some(order_id) => OrderRepo::find_by_id(&state.pool, order_id).await?,
            None => None,
        };
        let last_message = match MessageRepo::last(&state.pool, chat.id).await? {
            Some(message) => Some(message_view(state, message).await?),
            None => None,
        };
        let unreaded_message =
            MessageRepo::count_unread_in_chat(&state.pool, chat.id, auth.user_id).await?;
        views.push(ChatView {
            participants: members.remove(&chat.id).unwrap_or_default(),
            order,
            last_message,
            unreaded_message,
            chat,
        });
    }
    Ok(views)
}

/// Last path segment of a file URL, used as its display name.
fn file_name_from_url(file_url: &str) -> String {
    url::Url::parse(file_url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_owned))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| file_url.rsplit('/').next().unwrap_or(file_url).to_owned())
}

/// Size and media type of a remote file from a HEAD request.
///
/// Failures leave the metadata empty.
async fn fetch_file_metadata(state: &AppState, file_url: &str) -> CreateChatFile {
    let mut file = CreateChatFile {
        file_url: file_url.to_owned(),
        name: file_name_from_url(file_url),
        ..Default::default()
    };
    let timeout = Duration::from_secs(state.config.file_head_timeout_secs);
    match state.http.head(file_url).timeout(timeout).send().await {
        Ok(response) if response.status().is_success() => {
            let headers = response.headers();
            file.size = headers
                .get(reqwest::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            file.media_type = headers
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
        }
        Ok(response) => {
            tracing::debug!(url = %file_url, status = %response.status(), "File HEAD request rejected");
        }
        Err(e) => {
            tracing::debug!(url = %file_url, error = %e, "File HEAD request failed");
        }
    }
    file
}

/// Resolve file URLs to stored file rows, registering unknown ones.
async fn resolve_files(state: &AppState, urls: &[String]) -> AppResult<Vec<DbId>> {
    let mut ids = Vec::with_capacity(urls.len());
    for url in urls {
        let file = match ChatFileRepo::find_by_url(&state.pool, url).await? {
            Some(file) => file,
            None => ChatFileRepo::get_or_create(&state.pool, &fetch_file_metadata(state, url).await).await?,
        };
        ids.push(file.id);
    }
    Ok(ids)
}

/// Get or create both sides of a chat in one transaction.
///
/// Rows are upserted in `(user_id, role)` order whichever side opens the chat,
/// so concurrent requests for the same pair take their row locks in the same
/// order. Returns `(own, other)`.
async fn pair_participants(
    tx: &mut Transaction<'_, Postgres>,
    own: (DbId, ParticipantRole),
    other: (DbId, ParticipantRole),
) -> AppResult<(Participant, Participant)> {
    let own_first = (own.0, own.1.as_str()) <= (other.0, other.1.as_str());
    let (first, second) = if own_first { (own, other) } else { (other, own) };
    let first = ParticipantRepo::get_or_create(&mut **tx, first.0, first.1.as_str()).await?;
    let second = ParticipantRepo::get_or_create(&mut **tx, second.0, second.1.as_str()).await?;
    Ok(if own_first {
        (first, second)
    } else {
        (second, first)
    })
}

/// An `answer` must point at a message of the same chat.
async fn check_answer(state: &AppState, chat_id: DbId, answer: Option<DbId>) -> AppResult<()> {
    if let Some(answer_id) = answer {
        load_message(state, chat_id, answer_id).await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Chats
// ---------------------------------------------------------------------------

/// GET /api/v1/chat?role=
pub async fn list_chats(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<RoleParams>,
) -> AppResult<Json<Paginated<ChatView>>> {
    let role = caller_role(&state, &auth, params.role.as_deref()).await?;
    let window = params.window(CHAT_PAGE_SIZE);

    let Some(participant) =
        ParticipantRepo::find_by_user_role(&state.pool, auth.user_id, role.as_str()).await?
    else {
        ensure_page(&window, 0)?;
        return Ok(Json(Paginated::new(&window, 0, Vec::new())));
    };

    let count = ChatRepo::count_for_participant(&state.pool, participant.id).await?;
    ensure_page(&window, count)?;
    let chats =
        ChatRepo::list_for_participant(&state.pool, participant.id, window.limit(), window.offset())
            .await?;
    let results = chat_views(&state, &auth, chats).await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// POST /api/v1/chat
///
/// A client opens a chat with a chosen executor about their own order. An
/// executor responds to an order, paying its response cost from their
/// balance; the order's client is notified.
pub async fn create_chat(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateChatRequest>,
) -> AppResult<(StatusCode, Json<ChatView>)> {
    let role = caller_role(&state, &auth, input.role.as_deref()).await?;
    validate_required("title", &input.title)?;
    validate_max_len("title", &input.title, MAX_CHAT_TITLE_LEN)?;
    let cover = input.cover.as_deref().unwrap_or_default();

    let order = OrderRepo::find_by_id(&state.pool, input.order_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Order",
            id: input.order_id,
        })?;

    let chat = match role {
        ParticipantRole::Client => client_opens_chat(&state, &auth, &input, cover, &order).await?,
        ParticipantRole::Executor => executor_responds(&state, &auth, &input, cover, &order).await?,
        ParticipantRole::Moderator => return Err(AppError::Detail(NO_PROFILE_FOR_ROLE.into())),
    };

    let mut views = chat_views(&state, &auth, vec![chat]).await?;
    let view = views
        .pop()
        .ok_or_else(|| AppError::InternalError("chat view went missing".into()))?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn client_opens_chat(
    state: &AppState,
    auth: &AuthUser,
    input: &CreateChatRequest,
    cover: &str,
    order: &Order,
) -> AppResult<Chat> {
    let client = ProfileRepo::find_by_user(&state.pool, ProfileRole::Client, auth.user_id).await?;
    if client.map(|c| c.id) != Some(order.client_id) {
        return Err(forbidden());
    }
    let executor_id = input
        .executor
        .ok_or_else(|| AppError::Detail("Field `executor` is required for CLIENT role".into()))?;
    let executor = ProfileRepo::find_by_id(&state.pool, ProfileRole::Executor, executor_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ExecutorProfile",
            id: executor_id,
        })?;

    let mut tx = state.pool.begin().await?;
    let (own, other) = pair_participants(
        &mut tx,
        (auth.user_id, ParticipantRole::Client),
        (executor.user_id, ParticipantRole::Executor),
    )
    .await?;
    if ChatRepo::exists_for_pair(&mut *tx, order.id, own.id, other.id).await? {
        return Err(AppError::Detail(CHAT_EXISTS.into()));
    }
    let chat = ChatRepo::create(
        &mut tx,
        &CreateChat {
            title: &input.title,
            cover,
            associated_order_id: Some(order.id),
            participant_ids: &[own.id, other.id],
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(chat_id = %chat.id, order_id = %order.id, "Chat opened by client");
    Ok(chat)
}

async fn executor_responds(
    state: &AppState,
    auth: &AuthUser,
    input: &CreateChatRequest,
    cover: &str,
    order: &Order,
) -> AppResult<Chat> {
    let executor = ProfileRepo::find_by_user(&state.pool, ProfileRole::Executor, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Detail(NO_PROFILE_FOR_ROLE.into()))?;
    let client = ProfileRepo::find_by_id(&state.pool, ProfileRole::Client, order.client_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ClientProfile",
            id: order.client_id,
        })?;

    let mut tx = state.pool.begin().await?;
    let (own, other) = pair_participants(
        &mut tx,
        (auth.user_id, ParticipantRole::Executor),
        (client.user_id, ParticipantRole::Client),
    )
    .await?;
    if ChatRepo::exists_for_pair(&mut *tx, order.id, own.id, other.id).await? {
        return Err(AppError::Detail(CHAT_EXISTS.into()));
    }
    if !ProfileRepo::deduct_balance(&mut tx, executor.id, order.response_cost).await? {
        return Err(AppError::Detail(INSUFFICIENT_BALANCE.into()));
    }
    let chat = ChatRepo::create(
        &mut tx,
        &CreateChat {
            title: &input.title,
            cover,
            associated_order_id: Some(order.id),
            participant_ids: &[own.id, other.id],
        },
    )
    .await?;
    NotificationRepo::create(
        &mut *tx,
        &CreateNotification {
            user_id: client.user_id,
            title: "New response to your order".into(),
            content: Some(format!(
                "An executor responded to order #{}: {}",
                order.number, order.title
            )),
            icon: None,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        chat_id = %chat.id,
        order_id = %order.id,
        executor_id = %executor.id,
        cost = order.response_cost,
        "Executor responded to order"
    );
    Ok(chat)
}

/// GET /api/v1/chat/get_updates?role=
pub async fn get_updates(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<RoleParams>,
) -> AppResult<Json<CountResponse>> {
    let role = caller_role(&state, &auth, params.role.as_deref()).await?;
    let count =
        match ParticipantRepo::find_by_user_role(&state.pool, auth.user_id, role.as_str()).await? {
            Some(participant) => {
                MessageRepo::count_unread_for_participant(&state.pool, participant.id, auth.user_id)
                    .await?
            }
            None => 0,
        };
    Ok(Json(CountResponse { count }))
}

/// GET /api/v1/chat/{id}
pub async fn get_chat(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ChatView>> {
    let chat = load_chat(&state, id).await?;
    require_member(&state, &auth, id, None).await?;
    let mut views = chat_views(&state, &auth, vec![chat]).await?;
    views
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::InternalError("chat view went missing".into()))
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// GET /api/v1/chat/{id}/participant?role=
pub async fn list_participants(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<RoleParams>,
) -> AppResult<Json<Paginated<Participant>>> {
    let role = caller_role(&state, &auth, params.role.as_deref()).await?;
    load_chat(&state, id).await?;
    require_member(&state, &auth, id, Some(role)).await?;

    let window = params.window(CHAT_PARTICIPANTS_PAGE_SIZE);
    let count = ParticipantRepo::count_members(&state.pool, id).await?;
    ensure_page(&window, count)?;
    let results =
        ParticipantRepo::list_members(&state.pool, id, window.limit(), window.offset()).await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// POST /api/v1/chat/{id}/participant
///
/// Add the user with the given email as a moderator.
pub async fn add_participant(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddParticipantRequest>,
) -> AppResult<(StatusCode, Json<Participant>)> {
    load_chat(&state, id).await?;
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User with given email does not exist".into()))?;

    let participant =
        ParticipantRepo::get_or_create(&state.pool, user.id, ParticipantRole::Moderator.as_str())
            .await?;
    ParticipantRepo::add_member(&state.pool, id, participant.id).await?;
    tracing::info!(chat_id = %id, user_id = %user.id, "Moderator added to chat");
    Ok((StatusCode::CREATED, Json(participant)))
}

/// DELETE /api/v1/chat/{id}/participant/{participant_id}
pub async fn remove_participant(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((id, participant_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    load_chat(&state, id).await?;
    if !ParticipantRepo::remove_member(&state.pool, id, participant_id).await? {
        return Err(CoreError::NotFound {
            entity: "Participant",
            id: participant_id,
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// GET /api/v1/chat/{id}/message
///
/// Newest first. Reading the history marks other members' messages read.
pub async fn list_messages(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Paginated<MessageView>>> {
    load_chat(&state, id).await?;
    require_member(&state, &auth, id, None).await?;
    MessageRepo::mark_read_for_user(&state.pool, id, auth.user_id).await?;

    let window = params.window(CHAT_HISTORY_PAGE_SIZE);
    let count = MessageRepo::count(&state.pool, id).await?;
    ensure_page(&window, count)?;
    let messages = MessageRepo::list(&state.pool, id, window.limit(), window.offset()).await?;
    let results = with_files(&state, messages).await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// POST /api/v1/chat/{id}/message?role=
pub async fn create_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<MessageRoleParams>,
    Json(input): Json<CreateMessage>,
) -> AppResult<(StatusCode, Json<MessageView>)> {
    let role = caller_role(&state, &auth, params.role.as_deref()).await?;
    load_chat(&state, id).await?;
    let author = require_member(&state, &auth, id, Some(role)).await?;
    check_answer(&state, id, input.answer).await?;
    let file_ids = resolve_files(&state, &input.files_url).await?;

    let mut tx = state.pool.begin().await?;
    let message = MessageRepo::create(
        &mut *tx,
        id,
        author.id,
        input.text.as_deref(),
        input.audio.as_deref(),
        input.answer,
    )
    .await?;
    if !file_ids.is_empty() {
        MessageRepo::set_files(&mut tx, message.id, &file_ids).await?;
    }
    ChatRepo::touch(&mut *tx, id).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(message_view(&state, message).await?)))
}

/// PATCH /api/v1/chat/{id}/message/{message_id}?role=
pub async fn update_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, message_id)): Path<(DbId, DbId)>,
    Query(params): Query<MessageRoleParams>,
    Json(input): Json<UpdateMessage>,
) -> AppResult<Json<MessageView>> {
    let role = caller_role(&state, &auth, params.role.as_deref()).await?;
    load_chat(&state, id).await?;
    let author = require_member(&state, &auth, id, Some(role)).await?;
    let message = load_message(&state, id, message_id).await?;
    if message.author_id != Some(author.id) {
        return Err(forbidden());
    }
    check_answer(&state, id, input.answer).await?;
    let file_ids = match &input.files_url {
        Some(urls) => Some(resolve_files(&state, urls).await?),
        None => None,
    };

    let mut tx = state.pool.begin().await?;
    let updated = MessageRepo::update(
        &mut *tx,
        message_id,
        input.text.as_deref(),
        input.audio.as_deref(),
        input.answer,
    )
    .await?
    .ok_or(CoreError::NotFound {
        entity: "Message",
        id: message_id,
    })?;
    if let Some(file_ids) = &file_ids {
        MessageRepo::set_files(&mut tx, message_id, file_ids).await?;
    }
    tx.commit().await?;

    Ok(Json(message_view(&state, updated).await?))
}

/// DELETE /api/v1/chat/{id}/message/{message_id}
pub async fn delete_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, message_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    load_chat(&state, id).await?;
    require_member(&state, &auth, id, None).await?;
    let message = load_message(&state, id, message_id).await?;

    let author = match message.author_id {
        Some(author_id) => ParticipantRepo::find_by_id(&state.pool, author_id).await?,
        None => None,
    };
    if author.map(|a| a.user_id) != Some(auth.user_id) {
        return Err(forbidden());
    }

    MessageRepo::delete(&state.pool, message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_come_from_the_url_path() {
        assert_eq!(
            file_name_from_url("https://cdn.example.com/media/abc_report.pdf"),
            "abc_report.pdf"
        );
        assert_eq!(file_name_from_url("/media/photo.png"), "photo.png");
        assert_eq!(
            file_name_from_url("https://cdn.example.com/a/b.png?sig=1"),
            "b.png"
        );
    }
}
