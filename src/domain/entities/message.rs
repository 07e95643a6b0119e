//! Message entity and repository trait.
//!
//! Maps to the `messages` table in the message service schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// A direct message between two users.
///
/// Maps to the `messages` table:
/// - message_id: UUID PRIMARY KEY
/// - text: TEXT NOT NULL
/// - sender_id: UUID NOT NULL
/// - recipient_id: UUID NOT NULL
/// - is_read: BOOLEAN NOT NULL DEFAULT FALSE
/// - sent_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Build a new unread message.
    pub fn new(sender_id: Uuid, recipient_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            sender_id,
            recipient_id,
            is_read: false,
            sent_at: Utc::now(),
        }
    }
}

/// Repository trait for Message data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message.
    async fn create(&self, message: &Message) -> Result<(), AppError>;

    /// Atomically fetch every unread message for `recipient_id` and mark it
    /// read. Returns the rows as they were before the update, oldest first.
    async fn take_unread(&self, recipient_id: Uuid) -> Result<Vec<Message>, AppError>;
}
