//! Handlers for the `/order` resource.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use jobbit_core::enums::{OrderStatus, ProfileRole};
use jobbit_core::error::CoreError;
use jobbit_core::pagination::{PageWindow, DEFAULT_PAGE_SIZE};
use jobbit_core::types::DbId;
use jobbit_core::validation::{
    validate_date_range, validate_max_len, validate_non_negative, validate_required,
    MAX_ORDER_TITLE_LEN, MAX_SPECIFIC_TEXT_LEN, MAX_SPECIFIC_TITLE_LEN,
};
use jobbit_db::models::order::{CreateOrder, Order, OrderSpecific, UpdateOrder};
use jobbit_db::repositories::{OrderRepo, ProfileRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::profile::{forbidden, require_profile};
use crate::middleware::auth::AuthUser;
use crate::query::ensure_page;
use crate::response::Paginated;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderParams {
    pub status: Option<String>,
    pub page: Option<i64>,
}

fn validate_specifics(specifics: &[OrderSpecific]) -> Result<(), CoreError> {
    for specific in specifics {
        validate_max_len("specifics.title", &specific.title, MAX_SPECIFIC_TITLE_LEN)?;
        validate_max_len("specifics.text", &specific.text, MAX_SPECIFIC_TEXT_LEN)?;
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), CoreError> {
    validate_required("title", title)?;
    validate_max_len("title", title, MAX_ORDER_TITLE_LEN)
}

async fn load_order(state: &AppState, id: DbId) -> AppResult<Order> {
    OrderRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Order", id }.into())
}

/// Reject unless the caller owns the client profile that placed `order`.
async fn ensure_order_client(state: &AppState, auth: &AuthUser, order: &Order) -> AppResult<()> {
    let client = ProfileRepo::find_by_user(&state.pool, ProfileRole::Client, auth.user_id).await?;
    if client.map(|c| c.id) == Some(order.client_id) {
        Ok(())
    } else {
        Err(forbidden())
    }
}

/// GET /api/v1/order?status=
pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<OrderParams>,
) -> AppResult<Json<Paginated<Order>>> {
    let status = params
        .status
        .as_deref()
        .map(OrderStatus::from_str)
        .transpose()?;
    let status = status.map(|s| s.as_str());

    let window = PageWindow::new(params.page, DEFAULT_PAGE_SIZE);
    let count = OrderRepo::count(&state.pool, status).await?;
    ensure_page(&window, count)?;
    let results = OrderRepo::list(&state.pool, status, window.limit(), window.offset()).await?;
    Ok(Json(Paginated::new(&window, count, results)))
}

/// GET /api/v1/order/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Order>> {
    Ok(Json(load_order(&state, id).await?))
}

/// POST /api/v1/order
pub async fn create_order(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateOrder>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let client = require_profile(&state, ProfileRole::Client, auth.user_id).await?;
    validate_title(&input.title)?;
    if let Some(cost) = input.response_cost {
        validate_non_negative("response_cost", cost)?;
    }
    if let Some(budget) = input.budget {
        validate_non_negative("budget", budget)?;
    }
    validate_date_range(input.start_date, input.end_date)?;
    validate_specifics(&input.specifics)?;

    let order = OrderRepo::create(&state.pool, client.id, &input).await?;
    tracing::info!(order_id = %order.id, number = order.number, client_id = %client.id, "Order created");
    Ok((StatusCode::CREATED, Json(order)))
}

/// PATCH /api/v1/order/{id}
pub async fn update_order(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOrder>,
) -> AppResult<Json<Order>> {
    let order = load_order(&state, id).await?;
    ensure_order_client(&state, &auth, &order).await?;

    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(cost) = input.response_cost {
        validate_non_negative("response_cost", cost)?;
    }
    if let Some(status) = &input.status {
        OrderStatus::from_str(status)?;
    }
    if let Some(specifics) = &input.specifics {
        validate_specifics(specifics)?;
    }
    validate_date_range(
        input.start_date.or(order.start_date),
        input.end_date.or(order.end_date),
    )?;
    if let Some(executor_id) = input.executor_id {
        ProfileRepo::find_by_id(&state.pool, ProfileRole::Executor, executor_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "ExecutorProfile",
                id: executor_id,
            }))?;
    }

    let updated = OrderRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound { entity: "Order", id })?;
    Ok(Json(updated))
}

/// DELETE /api/v1/order/{id}
pub async fn delete_order(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let order = load_order(&state, id).await?;
    ensure_order_client(&state, &auth, &order).await?;
    OrderRepo::delete(&state.pool, id).await?;
    tracing::info!(order_id = %id, "Order deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specifics_are_bounded() {
        let ok = OrderSpecific {
            title: "Floor".into(),
            text: "Parquet".into(),
        };
        assert!(validate_specifics(&[ok.clone()]).is_ok());

        let long_title = OrderSpecific {
            title: "t".repeat(256),
            ..ok.clone()
        };
        assert!(validate_specifics(&[ok.clone(), long_title]).is_err());

        let long_text = OrderSpecific {
            text: "t".repeat(1025),
            ..ok
        };
        assert!(validate_specifics(&[long_text]).is_err());
    }

    #[test]
    fn title_is_required() {
        assert!(validate_title("Paint the fence").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title(&"x".repeat(513)).is_err());
    }
}
