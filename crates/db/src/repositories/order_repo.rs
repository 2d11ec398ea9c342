//! Repository for the `orders` table.

use sqlx::types::Json;
use sqlx::PgPool;
use jobbit_core::types::DbId;

use crate::models::order::{CreateOrder, Order, UpdateOrder};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, number, title, description, longitude, latitude, budget, \
                        response_cost, start_date, end_date, comment, status, client_id, \
                        executor_id, specifics, created_at, updated_at";

/// Provides CRUD operations for orders.
pub struct OrderRepo;

impl OrderRepo {
    /// Insert a new order for `client_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        client_id: DbId,
        input: &CreateOrder,
    ) -> Result<Order, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders
                (client_id, title, description, longitude, latitude, budget, response_cost,
                 start_date, end_date, comment, specifics)
             VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, 0), $6, COALESCE($7, 0),
                     $8, $9, COALESCE($10, ''), $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(client_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.longitude)
            .bind(input.latitude)
            .bind(input.budget)
            .bind(input.response_cost)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.comment)
            .bind(Json(&input.specifics))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List orders, newest first, optionally narrowed to one status.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders
             WHERE ($1::text IS NULL OR status = $1)
             ORDER BY created_at DESC, id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, status: Option<&str>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(pool)
        .await
    }

    /// Update an order. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOrder,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                longitude = COALESCE($4, longitude),
                latitude = COALESCE($5, latitude),
                budget = COALESCE($6, budget),
                response_cost = COALESCE($7, response_cost),
                start_date = COALESCE($8, start_date),
                end_date = COALESCE($9, end_date),
                comment = COALESCE($10, comment),
                status = COALESCE($11, status),
                executor_id = COALESCE($12, executor_id),
                specifics = COALESCE($13, specifics)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.longitude)
            .bind(input.latitude)
            .bind(input.budget)
            .bind(input.response_cost)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.comment)
            .bind(&input.status)
            .bind(input.executor_id)
            .bind(input.specifics.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
