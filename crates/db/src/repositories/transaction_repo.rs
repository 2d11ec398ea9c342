//! Repositories for `transactions` and `subscription_plans`.

use sqlx::PgPool;
use jobbit_core::types::DbId;

use crate::models::transaction::{CreateTransaction, SubscriptionPlan, Transaction};

const COLUMNS: &str = "id, status, pay_url, invoice_id, currency, payment_type, purpose, amount, \
                        provider, tx_type, user_id, user_role, created_at";

const PLAN_COLUMNS: &str = "id, currency, d1_pro_sub, w1_pro_sub, m1_pro_sub, m3_pro_sub";

pub struct TransactionRepo;

impl TransactionRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateTransaction,
    ) -> Result<Transaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO transactions
                (id, status, pay_url, invoice_id, currency, payment_type, purpose, amount,
                 provider, tx_type, user_id, user_role)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(input.id)
            .bind(&input.status)
            .bind(&input.pay_url)
            .bind(&input.invoice_id)
            .bind(&input.currency)
            .bind(&input.payment_type)
            .bind(&input.purpose)
            .bind(input.amount)
            .bind(&input.provider)
            .bind(&input.tx_type)
            .bind(input.user_id)
            .bind(&input.user_role)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transactions WHERE id = $1");
        sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The most recent transaction of the user in `status`, if any.
    pub async fn find_latest_with_status(
        pool: &PgPool,
        user_id: DbId,
        status: &str,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions
             WHERE user_id = $1 AND status = $2
             ORDER BY created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(user_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Cancel the user's unpaid invoices and drop their payment links.
    pub async fn cancel_created(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transactions SET status = 'CANCELED', pay_url = NULL
             WHERE user_id = $1 AND status = 'CREATED'",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// The user's transactions made in `user_role`, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        user_role: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions
             WHERE user_id = $1 AND ($2::text IS NULL OR user_role = $2)
             ORDER BY created_at DESC, id
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(user_id)
            .bind(user_role)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_user(
        pool: &PgPool,
        user_id: DbId,
        user_role: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM transactions
             WHERE user_id = $1 AND ($2::text IS NULL OR user_role = $2)",
        )
        .bind(user_id)
        .bind(user_role)
        .fetch_one(pool)
        .await
    }

    /// Persist a status observed at the acquirer.
    ///
    /// Returns the previous status alongside the updated row so callers can
    /// react to transitions.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<(String, Transaction)>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let previous: Option<String> =
            sqlx::query_scalar("SELECT status FROM transactions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(previous) = previous else {
            return Ok(None);
        };
        let query = format!("UPDATE transactions SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let updated = sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .bind(status)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some((previous, updated)))
    }
}

pub struct SubscriptionPlanRepo;

impl SubscriptionPlanRepo {
    pub async fn find_by_currency(
        pool: &PgPool,
        currency: &str,
    ) -> Result<Option<SubscriptionPlan>, sqlx::Error> {
        let query = format!("SELECT {PLAN_COLUMNS} FROM subscription_plans WHERE currency = $1");
        sqlx::query_as::<_, SubscriptionPlan>(&query)
            .bind(currency)
            .fetch_optional(pool)
            .await
    }
}
