//! Redis Streams event publisher.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{FIELD_PAYLOAD, FIELD_TYPE};
use crate::domain::{EventPublisher, UserEvent};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Appends user events to a Redis Stream with `XADD`.
#[derive(Clone)]
pub struct RedisEventPublisher {
    conn: ConnectionManager,
    stream: String,
}

impl RedisEventPublisher {
    pub fn new(conn: ConnectionManager, stream: impl Into<String>) -> Self {
        Self {
            conn,
            stream: stream.into(),
        }
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: &UserEvent) -> Result<(), AppError> {
        let event_type = event.event_type();
        let payload = event
            .payload()
            .map_err(|e| AppError::Internal(format!("Failed to serialize event: {}", e)))?;

        let mut conn = self.conn.clone();
        let entry_id: String = conn
            .xadd(
                &self.stream,
                "*",
                &[(FIELD_TYPE, event_type), (FIELD_PAYLOAD, payload.as_str())],
            )
            .await?;

        metrics::record_event_published(event_type);
        tracing::debug!(stream = %self.stream, entry_id = %entry_id, event_type, "Event published");

        Ok(())
    }
}
