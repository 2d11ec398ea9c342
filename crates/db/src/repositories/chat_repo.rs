//! Repositories for participants, chats, messages and chat files.

use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use jobbit_core::types::DbId;

use crate::models::chat::{
    Chat, ChatFile, CreateChat, CreateChatFile, Message, MessageFile, Participant,
};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

const PARTICIPANT_COLUMNS: &str = "id, user_id, role";

const CHAT_COLUMNS: &str = "id, title, cover, associated_order_id, created_at, updated_at";

const MESSAGE_COLUMNS: &str =
    "id, chat_id, author_id, text, audio, status, answer_id, created_at";

const FILE_COLUMNS: &str = "id, file_url, name, size, media_type";

// ---------------------------------------------------------------------------
// ParticipantRepo
// ---------------------------------------------------------------------------

pub struct ParticipantRepo;

impl ParticipantRepo {
    /// Return the participant for (user, role), creating it when missing.
    pub async fn get_or_create<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: DbId,
        role: &str,
    ) -> Result<Participant, sqlx::Error> {
        let query = format!(
            "INSERT INTO chat_participants (user_id, role) VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_chat_participants_user_role
             DO UPDATE SET role = EXCLUDED.role
             RETURNING {PARTICIPANT_COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(user_id)
            .bind(role)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!("SELECT {PARTICIPANT_COLUMNS} FROM chat_participants WHERE id = $1");
        sqlx::query_as::<_, Participant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_user_role(
        pool: &PgPool,
        user_id: DbId,
        role: &str,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM chat_participants WHERE user_id = $1 AND role = $2"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(user_id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// The caller's participant inside `chat_id`, optionally restricted to one role.
    pub async fn find_member(
        pool: &PgPool,
        chat_id: DbId,
        user_id: DbId,
        role: Option<&str>,
    ) -> Result<Option<Participant>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(
            "SELECT p.id, p.user_id, p.role FROM chat_participants p
             JOIN chat_members m ON m.participant_id = p.id
             WHERE m.chat_id = $1 AND p.user_id = $2 AND ($3::text IS NULL OR p.role = $3)
             ORDER BY p.role
             LIMIT 1",
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(pool)
        .await
    }

    /// Members of a chat, ordered by role.
    pub async fn list_members(
        pool: &PgPool,
        chat_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Participant>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(
            "SELECT p.id, p.user_id, p.role FROM chat_participants p
             JOIN chat_members m ON m.participant_id = p.id
             WHERE m.chat_id = $1
             ORDER BY p.role, p.id
             LIMIT $2 OFFSET $3",
        )
        .bind(chat_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn count_members(pool: &PgPool, chat_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chat_members WHERE chat_id = $1")
            .bind(chat_id)
            .fetch_one(pool)
            .await
    }

    /// Members of several chats at once, paired with their chat id.
    pub async fn list_members_for_chats(
        pool: &PgPool,
        chat_ids: &[DbId],
    ) -> Result<Vec<(DbId, Participant)>, sqlx::Error> {
        let rows: Vec<(DbId, DbId, DbId, String)> = sqlx::query_as(
            "SELECT m.chat_id, p.id, p.user_id, p.role FROM chat_participants p
             JOIN chat_members m ON m.participant_id = p.id
             WHERE m.chat_id = ANY($1)
             ORDER BY p.role, p.id",
        )
        .bind(chat_ids)
        .fetch_all(pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(chat_id, id, user_id, role)| (chat_id, Participant { id, user_id, role }))
            .collect())
    }

    /// Add a participant to a chat. Adding an existing member is a no-op.
    pub async fn add_member(
        pool: &PgPool,
        chat_id: DbId,
        participant_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO chat_members (chat_id, participant_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(chat_id)
        .bind(participant_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn remove_member(
        pool: &PgPool,
        chat_id: DbId,
        participant_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM chat_members WHERE chat_id = $1 AND participant_id = $2")
                .bind(chat_id)
                .bind(participant_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// ChatRepo
// ---------------------------------------------------------------------------

pub struct ChatRepo;

impl ChatRepo {
    /// Insert a chat and its members inside `tx`.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateChat<'_>,
    ) -> Result<Chat, sqlx::Error> {
        let query = format!(
            "INSERT INTO chats (title, cover, associated_order_id)
             VALUES ($1, $2, $3)
             RETURNING {CHAT_COLUMNS}"
        );
        let chat = sqlx::query_as::<_, Chat>(&query)
            .bind(input.title)
            .bind(input.cover)
            .bind(input.associated_order_id)
            .fetch_one(&mut **tx)
            .await?;
        sqlx::query(
            "INSERT INTO chat_members (chat_id, participant_id)
             SELECT $1, UNNEST($2::uuid[])
             ON CONFLICT DO NOTHING",
        )
        .bind(chat.id)
        .bind(input.participant_ids)
        .execute(&mut **tx)
        .await?;
        Ok(chat)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Chat>, sqlx::Error> {
        let query = format!("SELECT {CHAT_COLUMNS} FROM chats WHERE id = $1");
        sqlx::query_as::<_, Chat>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a chat about `order_id` already joins both participants.
    pub async fn exists_for_pair<'e, E: PgExecutor<'e>>(
        executor: E,
        order_id: DbId,
        first: DbId,
        second: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM chats c
                WHERE c.associated_order_id = $1
                  AND EXISTS (SELECT 1 FROM chat_members m
                              WHERE m.chat_id = c.id AND m.participant_id = $2)
                  AND EXISTS (SELECT 1 FROM chat_members m
                              WHERE m.chat_id = c.id AND m.participant_id = $3))",
        )
        .bind(order_id)
        .bind(first)
        .bind(second)
        .fetch_one(executor)
        .await
    }

    /// Chats a participant belongs to, most recently active first.
    pub async fn list_for_participant(
        pool: &PgPool,
        participant_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Chat>, sqlx::Error> {
        sqlx::query_as::<_, Chat>(
            "SELECT c.id, c.title, c.cover, c.associated_order_id, c.created_at, c.updated_at
             FROM chats c
             JOIN chat_members m ON m.chat_id = c.id
             WHERE m.participant_id = $1
             ORDER BY c.updated_at DESC, c.id
             LIMIT $2 OFFSET $3",
        )
        .bind(participant_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn count_for_participant(
        pool: &PgPool,
        participant_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM chat_members WHERE participant_id = $1",
        )
        .bind(participant_id)
        .fetch_one(pool)
        .await
    }

    /// Bump `updated_at` so the chat sorts first in listings.
    pub async fn touch<'e, E: PgExecutor<'e>>(executor: E, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE chats SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MessageRepo
// ---------------------------------------------------------------------------

pub struct MessageRepo;

impl MessageRepo {
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        chat_id: DbId,
        author_id: DbId,
        text: Option<&str>,
        audio: Option<&str>,
        answer_id: Option<DbId>,
    ) -> Result<Message, sqlx::Error> {
        let query = format!(
            "INSERT INTO chat_messages (chat_id, author_id, text, audio, answer_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {MESSAGE_COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(chat_id)
            .bind(author_id)
            .bind(text)
            .bind(audio)
            .bind(answer_id)
            .fetch_one(executor)
            .await
    }

    /// Find a message by id within one chat.
    pub async fn find(pool: &PgPool, chat_id: DbId, id: DbId) -> Result<Option<Message>, sqlx::Error> {
        let query =
            format!("SELECT {MESSAGE_COLUMNS} FROM chat_messages WHERE id = $1 AND chat_id = $2");
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .bind(chat_id)
            .fetch_optional(pool)
            .await
    }

    /// Messages of a chat, newest first.
    pub async fn list(
        pool: &PgPool,
        chat_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages WHERE chat_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(chat_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, chat_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chat_messages WHERE chat_id = $1")
            .bind(chat_id)
            .fetch_one(pool)
            .await
    }

    /// The newest message of a chat.
    pub async fn last(pool: &PgPool, chat_id: DbId) -> Result<Option<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages WHERE chat_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(chat_id)
            .fetch_optional(pool)
            .await
    }

    /// Mark every message in the chat not authored by `user_id` as read.
    pub async fn mark_read_for_user(
        pool: &PgPool,
        chat_id: DbId,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE chat_messages msg SET status = 'READ'
             WHERE msg.chat_id = $1 AND msg.status = 'NOT_READ'
               AND NOT EXISTS (SELECT 1 FROM chat_participants p
                               WHERE p.id = msg.author_id AND p.user_id = $2)",
        )
        .bind(chat_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Unread messages in one chat that `user_id` did not write.
    pub async fn count_unread_in_chat(
        pool: &PgPool,
        chat_id: DbId,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM chat_messages msg
             WHERE msg.chat_id = $1 AND msg.status = 'NOT_READ'
               AND NOT EXISTS (SELECT 1 FROM chat_participants p
                               WHERE p.id = msg.author_id AND p.user_id = $2)",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Unread messages across every chat of `participant_id` not written by its user.
    pub async fn count_unread_for_participant(
        pool: &PgPool,
        participant: DbId,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM chat_messages msg
             JOIN chat_members m ON m.chat_id = msg.chat_id
             WHERE m.participant_id = $1 AND msg.status = 'NOT_READ'
               AND NOT EXISTS (SELECT 1 FROM chat_participants p
                               WHERE p.id = msg.author_id AND p.user_id = $2)",
        )
        .bind(participant)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Update message content. Only non-`None` fields are applied.
    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        text: Option<&str>,
        audio: Option<&str>,
        answer_id: Option<DbId>,
    ) -> Result<Option<Message>, sqlx::Error> {
        let query = format!(
            "UPDATE chat_messages SET
                text = COALESCE($2, text),
                audio = COALESCE($3, audio),
                answer_id = COALESCE($4, answer_id)
             WHERE id = $1
             RETURNING {MESSAGE_COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .bind(text)
            .bind(audio)
            .bind(answer_id)
            .fetch_optional(executor)
            .await
    }

    /// Replace the files attached to a message. An empty slice clears them.
    pub async fn set_files(
        tx: &mut Transaction<'_, Postgres>,
        message_id: DbId,
        file_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM chat_message_files WHERE message_id = $1")
            .bind(message_id)
            .execute(&mut **tx)
            .await?;
        sqlx::query(
            "INSERT INTO chat_message_files (message_id, file_id)
             SELECT $1, UNNEST($2::uuid[])
             ON CONFLICT DO NOTHING",
        )
        .bind(message_id)
        .bind(file_ids)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// ChatFileRepo
// ---------------------------------------------------------------------------

pub struct ChatFileRepo;

impl ChatFileRepo {
    pub async fn find_by_url(pool: &PgPool, file_url: &str) -> Result<Option<ChatFile>, sqlx::Error> {
        let query = format!("SELECT {FILE_COLUMNS} FROM chat_files WHERE file_url = $1");
        sqlx::query_as::<_, ChatFile>(&query)
            .bind(file_url)
            .fetch_optional(pool)
            .await
    }

    /// Insert file metadata, returning the existing row when the URL is known.
    pub async fn get_or_create(pool: &PgPool, input: &CreateChatFile) -> Result<ChatFile, sqlx::Error> {
        let query = format!(
            "INSERT INTO chat_files (file_url, name, size, media_type)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_chat_files_file_url
             DO UPDATE SET file_url = EXCLUDED.file_url
             RETURNING {FILE_COLUMNS}"
        );
        sqlx::query_as::<_, ChatFile>(&query)
            .bind(&input.file_url)
            .bind(&input.name)
            .bind(input.size)
            .bind(&input.media_type)
            .fetch_one(pool)
            .await
    }

    /// Files attached to any of the given messages.
    pub async fn list_for_messages(
        pool: &PgPool,
        message_ids: &[DbId],
    ) -> Result<Vec<MessageFile>, sqlx::Error> {
        sqlx::query_as::<_, MessageFile>(
            "SELECT mf.message_id, f.id, f.file_url, f.name, f.size, f.media_type
             FROM chat_message_files mf
             JOIN chat_files f ON f.id = mf.file_id
             WHERE mf.message_id = ANY($1)
             ORDER BY f.name, f.id",
        )
        .bind(message_ids)
        .fetch_all(pool)
        .await
    }
}
