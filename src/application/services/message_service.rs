//! Message Service
//!
//! Sends direct messages to users known to the local replica and hands out
//! the unread inbox, marking it read in the same step.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AvailableUserRepository, Message, MessageRepository};
use crate::shared::error::{AppError, ErrorCode};

/// Message service trait
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Send `text` from `sender_id` to the user registered under `recipient_email`.
    async fn send_message(
        &self,
        sender_id: Uuid,
        recipient_email: &str,
        text: &str,
    ) -> Result<(), MessageError>;

    /// Return every unread message for `recipient_id`, oldest first, and mark
    /// them read.
    async fn get_messages(&self, recipient_id: Uuid) -> Result<Vec<Message>, MessageError>;
}

/// Message service errors
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Recipient User not exists")]
    RecipientUserNotExists,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<MessageError> for AppError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::RecipientUserNotExists => AppError::Business {
                code: ErrorCode::Conflict,
                message: "Message.Recipient",
                description: err.to_string(),
            },
            MessageError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// MessageService implementation
pub struct MessageServiceImpl<M, A>
where
    M: MessageRepository,
    A: AvailableUserRepository,
{
    message_repo: Arc<M>,
    user_repo: Arc<A>,
}

impl<M, A> MessageServiceImpl<M, A>
where
    M: MessageRepository,
    A: AvailableUserRepository,
{
    /// Create a new MessageServiceImpl
    pub fn new(message_repo: Arc<M>, user_repo: Arc<A>) -> Self {
        Self {
            message_repo,
            user_repo,
        }
    }
}

#[async_trait]
impl<M, A> MessageService for MessageServiceImpl<M, A>
where
    M: MessageRepository + 'static,
    A: AvailableUserRepository + 'static,
{
    async fn send_message(
        &self,
        sender_id: Uuid,
        recipient_email: &str,
        text: &str,
    ) -> Result<(), MessageError> {
        let recipient = self
            .user_repo
            .find_by_email(recipient_email)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?
            .ok_or(MessageError::RecipientUserNotExists)?;

        let message = Message::new(sender_id, recipient.id, text.to_string());

        self.message_repo
            .create(&message)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?;

        tracing::info!(
            message_id = %message.id,
            sender_id = %sender_id,
            recipient_id = %recipient.id,
            "Message sent"
        );

        Ok(())
    }

    async fn get_messages(&self, recipient_id: Uuid) -> Result<Vec<Message>, MessageError> {
        let messages = self
            .message_repo
            .take_unread(recipient_id)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?;

        tracing::debug!(
            recipient_id = %recipient_id,
            count = messages.len(),
            "Inbox retrieved"
        );

        Ok(messages)
    }
}
