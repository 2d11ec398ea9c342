//! Repository for `client_feedbacks` and `executor_feedbacks`.
//!
//! `role` names the kind of the profile the feedback is about.

use sqlx::PgPool;
use jobbit_core::enums::ProfileRole;
use jobbit_core::types::DbId;

use crate::models::feedback::{CreateFeedback, Feedback, UpdateFeedback};
use crate::repositories::profile_repo::tables;

const COLUMNS: &str = "id, author_id, profile_id, text, answer, rate, created_at";

pub struct FeedbackRepo;

impl FeedbackRepo {
    pub async fn create(
        pool: &PgPool,
        role: ProfileRole,
        profile_id: DbId,
        author_id: DbId,
        input: &CreateFeedback,
    ) -> Result<Feedback, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (author_id, profile_id, text, rate)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}",
            tables(role).feedbacks
        );
        sqlx::query_as::<_, Feedback>(&query)
            .bind(author_id)
            .bind(profile_id)
            .bind(&input.text)
            .bind(input.rate)
            .fetch_one(pool)
            .await
    }

    /// Find a feedback on `profile_id` by id.
    pub async fn find(
        pool: &PgPool,
        role: ProfileRole,
        profile_id: DbId,
        id: DbId,
    ) -> Result<Option<Feedback>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE id = $1 AND profile_id = $2",
            tables(role).feedbacks
        );
        sqlx::query_as::<_, Feedback>(&query)
            .bind(id)
            .bind(profile_id)
            .fetch_optional(pool)
            .await
    }

    /// Feedback received by `profile_id`, newest first.
    pub async fn list_for_profile(
        pool: &PgPool,
        role: ProfileRole,
        profile_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Feedback>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE profile_id = $1
             ORDER BY created_at DESC, id
             LIMIT $2 OFFSET $3",
            tables(role).feedbacks
        );
        sqlx::query_as::<_, Feedback>(&query)
            .bind(profile_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_profile(
        pool: &PgPool,
        role: ProfileRole,
        profile_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE profile_id = $1",
            tables(role).feedbacks
        );
        sqlx::query_scalar::<_, i64>(&query)
            .bind(profile_id)
            .fetch_one(pool)
            .await
    }

    /// Update a feedback. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        role: ProfileRole,
        id: DbId,
        input: &UpdateFeedback,
    ) -> Result<Option<Feedback>, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET
                text = COALESCE($2, text),
                rate = COALESCE($3, rate)
             WHERE id = $1
             RETURNING {COLUMNS}",
            tables(role).feedbacks
        );
        sqlx::query_as::<_, Feedback>(&query)
            .bind(id)
            .bind(&input.text)
            .bind(input.rate)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_answer(
        pool: &PgPool,
        role: ProfileRole,
        id: DbId,
        answer: &str,
    ) -> Result<Option<Feedback>, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET answer = $2 WHERE id = $1 RETURNING {COLUMNS}",
            tables(role).feedbacks
        );
        sqlx::query_as::<_, Feedback>(&query)
            .bind(id)
            .bind(answer)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, role: ProfileRole, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE id = $1", tables(role).feedbacks);
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
