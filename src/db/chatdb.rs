// db/chatdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::chatmodel::*;

#[async_trait]
pub trait ChatExt {
    async fn create_or_get_conversation(
        &self,
        user_one_id: Uuid,
        user_two_id: Uuid,
        booking_id: Option<Uuid>,
    ) -> Result<Conversation, Error>;

    async fn get_conversation_by_id(&self, conversation_id: Uuid) -> Result<Option<Conversation>, Error>;

    async fn get_user_conversations(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ConversationSummary>, Error>;

    async fn send_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message, Error>;

    async fn get_conversation_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, Error>;

    /// Marks the other participant's messages as read; returns how many changed.
    async fn mark_messages_as_read(&self, conversation_id: Uuid, reader_id: Uuid) -> Result<u64, Error>;

    async fn get_unread_message_count(&self, user_id: Uuid) -> Result<i64, Error>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn create_or_get_conversation(
        &self,
        user_one_id: Uuid,
        user_two_id: Uuid,
        booking_id: Option<Uuid>,
    ) -> Result<Conversation, Error> {
        let (first, second) = Conversation::ordered_pair(user_one_id, user_two_id);

        let existing = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT * FROM conversations
            WHERE participant_one = $1 AND participant_two = $2
              AND booking_id IS NOT DISTINCT FROM $3
            "#
        )
        .bind(first)
        .bind(second)
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(conversation) = existing {
            return Ok(conversation);
        }

        let inserted = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (participant_one, participant_two, booking_id)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            RETURNING *
            "#
        )
        .bind(first)
        .bind(second)
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(conversation) => Ok(conversation),
            // Lost a race with a concurrent insert of the same pair.
            None => sqlx::query_as::<_, Conversation>(
                r#"
                SELECT * FROM conversations
                WHERE participant_one = $1 AND participant_two = $2
                  AND booking_id IS NOT DISTINCT FROM $3
                "#
            )
            .bind(first)
            .bind(second)
            .bind(booking_id)
            .fetch_one(&self.pool)
            .await,
        }
    }

    async fn get_conversation_by_id(&self, conversation_id: Uuid) -> Result<Option<Conversation>, Error> {
        sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
            .bind(conversation_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_user_conversations(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ConversationSummary>, Error> {
        sqlx::query_as::<_, ConversationSummary>(
            r#"
            SELECT
                c.id,
                u.id AS other_user_id,
                u.name AS other_user_name,
                c.booking_id,
                c.last_message_at,
                (
                    SELECT COUNT(*) FROM messages m
                    WHERE m.conversation_id = c.id
                      AND m.sender_id <> $1
                      AND m.read_at IS NULL
                ) AS unread_count
            FROM conversations c
            JOIN users u ON u.id = CASE WHEN c.participant_one = $1 THEN c.participant_two ELSE c.participant_one END
            WHERE c.participant_one = $1 OR c.participant_two = $1
            ORDER BY c.last_message_at DESC NULLS LAST, c.created_at DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn send_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message, Error> {
        let mut tx = self.pool.begin().await?;

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (conversation_id, sender_id, content)
            VALUES ($1, $2, $3)
            RETURNING *
            "#
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE conversations SET last_message_at = $2 WHERE id = $1")
            .bind(conversation_id)
            .bind(message.created_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(message)
    }

    async fn get_conversation_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, Error> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(conversation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_messages_as_read(&self, conversation_id: Uuid, reader_id: Uuid) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE messages SET read_at = NOW()
            WHERE conversation_id = $1 AND sender_id <> $2 AND read_at IS NULL
            "#
        )
        .bind(conversation_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn get_unread_message_count(&self, user_id: Uuid) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM messages m
            JOIN conversations c ON c.id = m.conversation_id
            WHERE (c.participant_one = $1 OR c.participant_two = $1)
              AND m.sender_id <> $1
              AND m.read_at IS NULL
            "#
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }
}
