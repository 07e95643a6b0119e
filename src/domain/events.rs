//! User lifecycle events.
//!
//! The user service commits each event to its outbox in the same transaction
//! as the account change, and a relay appends it to the bus afterwards. The
//! message service consumes them to maintain its user replica. Delivery is
//! at-least-once and not ordered across retries, so every consumer must
//! tolerate duplicates and late arrivals.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Wire name of [`UserRegisteredEvent`].
pub const USER_REGISTERED: &str = "UserRegistered";

/// Wire name of [`UserDeletedEvent`].
pub const USER_DELETED: &str = "UserDeleted";

/// A user account was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegisteredEvent {
    pub id: Uuid,
    pub email: String,
}

/// A user account was removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDeletedEvent {
    pub id: Uuid,
}

/// Envelope over all user lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    Registered(UserRegisteredEvent),
    Deleted(UserDeletedEvent),
}

impl UserEvent {
    /// Wire name used as the stream entry's `type` field.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Registered(_) => USER_REGISTERED,
            Self::Deleted(_) => USER_DELETED,
        }
    }

    /// JSON payload stored in the stream entry's `payload` field.
    pub fn payload(&self) -> serde_json::Result<String> {
        match self {
            Self::Registered(event) => serde_json::to_string(event),
            Self::Deleted(event) => serde_json::to_string(event),
        }
    }

    /// Rebuild an event from its wire name and payload.
    pub fn from_wire(event_type: &str, payload: &str) -> Result<Self, AppError> {
        let parsed = match event_type {
            USER_REGISTERED => serde_json::from_str(payload).map(Self::Registered),
            USER_DELETED => serde_json::from_str(payload).map(Self::Deleted),
            other => return Err(AppError::Internal(format!("Unknown event type: {}", other))),
        };
        parsed.map_err(|e| AppError::Internal(format!("Malformed {} payload: {}", event_type, e)))
    }
}

/// An event committed to the outbox and not yet on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxEntry {
    pub seq: i64,
    pub event: UserEvent,
}

/// Events waiting to be relayed. Rows are written by the user repository
/// inside the transaction that changes the account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutboxRepository: Send + Sync {
    /// Up to `limit` entries, oldest first.
    async fn pending(&self, limit: i64) -> Result<Vec<OutboxEntry>, AppError>;

    /// Forget an entry once it has been published.
    async fn remove(&self, seq: i64) -> Result<(), AppError>;
}

/// Outbound side of the event bus.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Append an event to the bus.
    async fn publish(&self, event: &UserEvent) -> Result<(), AppError>;
}
