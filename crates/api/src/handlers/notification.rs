//! Handlers for the caller's in-app notifications.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use jobbit_core::pagination::DEFAULT_PAGE_SIZE;
use jobbit_core::types::DbId;
use jobbit_db::models::notification::Notification;
use jobbit_db::repositories::NotificationRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{ensure_page, PageParams};
use crate::response::{CountResponse, Paginated};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReadRequest {
    pub id: DbId,
}

/// GET /api/v1/notification
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Paginated<Notification>>> {
    let window = params.window(DEFAULT_PAGE_SIZE);
    let count = NotificationRepo::count_for_user(&state.pool, auth.user_id).await?;
    ensure_page(&window, count)?;
    let results =
        NotificationRepo::list_for_user(&state.pool, auth.user_id, window.limit(), window.offset())
            .await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// POST /api/v1/notification/read
pub async fn read(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ReadRequest>,
) -> AppResult<StatusCode> {
    if !NotificationRepo::mark_read(&state.pool, input.id, auth.user_id).await? {
        return Err(AppError::Detail("Notification does not exist".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notification/read_all
pub async fn read_all(auth: AuthUser, State(state): State<AppState>) -> AppResult<StatusCode> {
    let marked = NotificationRepo::mark_all_read(&state.pool, auth.user_id).await?;
    tracing::debug!(user_id = %auth.user_id, marked, "Notifications marked read");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/notification/check
pub async fn check(auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<CountResponse>> {
    let count = NotificationRepo::count_unread(&state.pool, auth.user_id).await?;
    Ok(Json(CountResponse { count }))
}
