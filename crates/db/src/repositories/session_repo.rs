//! Repository for the `user_sessions` table.

use sqlx::PgPool;
use jobbit_core::types::{DbId, Timestamp};

use crate::models::session::{CreateSession, UserSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, session_key, refresh_token_hash, ip_address, user_agent, \
                        expires_at, created_at, last_updated_at";

/// Provides CRUD operations for login sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions
                (user_id, session_key, refresh_token_hash, ip_address, user_agent, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.session_key)
            .bind(&input.refresh_token_hash)
            .bind(&input.ip_address)
            .bind(&input.user_agent)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an unexpired session by its key.
    pub async fn find_by_session_key(
        pool: &PgPool,
        session_key: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE session_key = $1 AND expires_at > NOW()"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(session_key)
            .fetch_optional(pool)
            .await
    }

    /// Find an unexpired session by its refresh token hash.
    pub async fn find_by_refresh_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE refresh_token_hash = $1 AND expires_at > NOW()"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Bind the session to a freshly issued access token.
    pub async fn rebind(
        pool: &PgPool,
        id: DbId,
        session_key: &str,
        expires_at: Timestamp,
    ) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions
             SET session_key = $2, expires_at = $3, last_updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(id)
            .bind(session_key)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Delete the session bound to `session_key`. Returns `true` if a row was removed.
    pub async fn delete_by_session_key(pool: &PgPool, session_key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE session_key = $1")
            .bind(session_key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every session of a user. Returns the count of deleted rows.
    pub async fn delete_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
