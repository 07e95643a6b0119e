//! User event handlers
//!
//! Keeps the message service's user replica in sync. Handlers are looked up
//! by event type in an [`EventDispatcher`]; each one is idempotent so that
//! redelivered events leave the replica unchanged, and a registration retried
//! after its user's deletion is ignored.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::events::{USER_DELETED, USER_REGISTERED};
use crate::domain::{AvailableUser, AvailableUserRepository, UserDeletedEvent, UserRegisteredEvent};

/// Event handling errors
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Unknown event type: {0}")]
    UnknownType(String),

    #[error("Malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EventError {
    /// Whether redelivering the same entry could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EventError::Internal(_))
    }
}

/// Handler for one event type.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Apply the JSON payload of one event.
    async fn handle(&self, payload: &str) -> Result<(), EventError>;
}

/// Upserts the replica row for a newly registered user.
pub struct UserRegisteredHandler<A: AvailableUserRepository> {
    users: Arc<A>,
}

impl<A: AvailableUserRepository> UserRegisteredHandler<A> {
    pub fn new(users: Arc<A>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<A: AvailableUserRepository + 'static> EventHandler for UserRegisteredHandler<A> {
    async fn handle(&self, payload: &str) -> Result<(), EventError> {
        let event: UserRegisteredEvent = serde_json::from_str(payload)?;

        let stored = self
            .users
            .upsert(&AvailableUser {
                id: event.id,
                email: event.email,
            })
            .await
            .map_err(|e| EventError::Internal(e.to_string()))?;

        if stored {
            tracing::info!(user_id = %event.id, "Replica user added");
        } else {
            tracing::info!(user_id = %event.id, "Replica user already deleted, ignoring registration");
        }
        Ok(())
    }
}

/// Removes the replica row of a deleted user, if any.
pub struct UserDeletedHandler<A: AvailableUserRepository> {
    users: Arc<A>,
}

impl<A: AvailableUserRepository> UserDeletedHandler<A> {
    pub fn new(users: Arc<A>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<A: AvailableUserRepository + 'static> EventHandler for UserDeletedHandler<A> {
    async fn handle(&self, payload: &str) -> Result<(), EventError> {
        let event: UserDeletedEvent = serde_json::from_str(payload)?;

        let removed = self
            .users
            .delete(event.id)
            .await
            .map_err(|e| EventError::Internal(e.to_string()))?;

        if removed {
            tracing::info!(user_id = %event.id, "Replica user removed");
        } else {
            tracing::debug!(user_id = %event.id, "Replica user already absent");
        }
        Ok(())
    }
}

/// Dispatch table keyed by event type.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<&'static str, Box<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher wired with the replica handlers.
    pub fn for_replica<A: AvailableUserRepository + 'static>(users: Arc<A>) -> Self {
        Self::new()
            .register(USER_REGISTERED, UserRegisteredHandler::new(users.clone()))
            .register(USER_DELETED, UserDeletedHandler::new(users))
    }

    /// Route `event_type` to `handler`, replacing any previous handler.
    pub fn register<H: EventHandler + 'static>(mut self, event_type: &'static str, handler: H) -> Self {
        self.handlers.insert(event_type, Box::new(handler));
        self
    }

    /// Run the handler registered for `event_type`.
    pub async fn dispatch(&self, event_type: &str, payload: &str) -> Result<(), EventError> {
        match self.handlers.get(event_type) {
            Some(handler) => handler.handle(payload).await,
            None => Err(EventError::UnknownType(event_type.to_string())),
        }
    }
}
