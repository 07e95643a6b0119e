//! Message Repository Implementation
//!
//! PostgreSQL implementation of message storage and the locked
//! read-and-mark-as-read inbox query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Message, MessageRepository};
use crate::infrastructure::database::with_transaction;
use crate::shared::error::AppError;

/// PostgreSQL message repository implementation.
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    message_id: Uuid,
    text: String,
    sender_id: Uuid,
    recipient_id: Uuid,
    is_read: bool,
    sent_at: DateTime<Utc>,
}

impl MessageRow {
    /// Converts database row to domain Message entity.
    fn into_message(self) -> Message {
        Message {
            id: self.message_id,
            text: self.text,
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            is_read: self.is_read,
            sent_at: self.sent_at,
        }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, message: &Message) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO messages (message_id, text, sender_id, recipient_id, is_read, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id)
        .bind(&message.text)
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(message.is_read)
        .bind(message.sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Row locks make a concurrent call for the same recipient wait, then see
    /// the rows already marked read.
    async fn take_unread(&self, recipient_id: Uuid) -> Result<Vec<Message>, AppError> {
        with_transaction(&self.pool, |mut tx| async move {
            let rows = sqlx::query_as::<_, MessageRow>(
                r#"
                SELECT message_id, text, sender_id, recipient_id, is_read, sent_at
                FROM messages
                WHERE recipient_id = $1 AND is_read = FALSE
                ORDER BY sent_at
                FOR UPDATE
                "#,
            )
            .bind(recipient_id)
            .fetch_all(tx.conn())
            .await?;

            if !rows.is_empty() {
                let ids: Vec<Uuid> = rows.iter().map(|r| r.message_id).collect();
                sqlx::query("UPDATE messages SET is_read = TRUE WHERE message_id = ANY($1)")
                    .bind(&ids)
                    .execute(tx.conn())
                    .await?;
            }

            let messages: Vec<Message> = rows.into_iter().map(MessageRow::into_message).collect();
            Ok::<_, AppError>((messages, tx))
        })
        .await
    }
}
