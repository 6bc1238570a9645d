// src/repositories/postgres/chat_messages.rs

use crate::Error;
use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use hemolink_common::models::chat::ChatMessage;
pub(crate) use hemolink_common::traits::repository_traits::ChatMessageRepository;

#[derive(Clone)]
pub struct PostgresChatMessageRepository {
    pool: Pool<Postgres>,
}

impl PostgresChatMessageRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatMessageRepository for PostgresChatMessageRepository {
    async fn insert_message(&self, message: &ChatMessage) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO chat_messages (
                message_id,
                sender_id,
                recipient_id,
                content,
                sent_at
            )
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
            .bind(message.message_id)
            .bind(message.sender_id)
            .bind(message.recipient_id)
            .bind(&message.content)
            .bind(message.sent_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn conversation(&self, a: Uuid, b: Uuid) -> Result<Vec<ChatMessage>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT message_id, sender_id, recipient_id, content, sent_at
            FROM chat_messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY sent_at
            "#,
        )
            .bind(a)
            .bind(b)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|r| {
                Ok(ChatMessage {
                    message_id: r.try_get("message_id")?,
                    sender_id: r.try_get("sender_id")?,
                    recipient_id: r.try_get("recipient_id")?,
                    content: r.try_get("content")?,
                    sent_at: r.try_get("sent_at")?,
                })
            })
            .collect()
    }
}
