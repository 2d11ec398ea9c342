//! Repository for the `otp_challenges` table.

use sqlx::PgPool;
use jobbit_core::types::Timestamp;

/// Stores the numeric code issued alongside each one-time token.
pub struct OtpRepo;

impl OtpRepo {
    /// Record a challenge. Re-issuing the same token replaces its code.
    pub async fn create(
        pool: &PgPool,
        token_hash: &str,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO otp_challenges (token_hash, code, expires_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (token_hash) DO UPDATE
             SET code = EXCLUDED.code, expires_at = EXCLUDED.expires_at, failed_attempts = 0",
        )
        .bind(token_hash)
        .bind(code)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete the challenge when the code matches, it has not expired and
    /// fewer than `max_attempts` wrong codes were tried against it.
    ///
    /// Returns `true` exactly once per challenge. A mismatch counts as a
    /// failed attempt.
    pub async fn consume(
        pool: &PgPool,
        token_hash: &str,
        code: &str,
        max_attempts: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM otp_challenges
             WHERE token_hash = $1 AND code = $2 AND expires_at > NOW()
               AND failed_attempts < $3",
        )
        .bind(token_hash)
        .bind(code)
        .bind(max_attempts)
        .execute(pool)
        .await?;
        if result.rows_affected() > 0 {
            return Ok(true);
        }

        sqlx::query(
            "UPDATE otp_challenges SET failed_attempts = failed_attempts + 1
             WHERE token_hash = $1",
        )
        .bind(token_hash)
        .execute(pool)
        .await?;
        Ok(false)
    }

    /// Drop expired challenges. Returns the count of deleted rows.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM otp_challenges WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
