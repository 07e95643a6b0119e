//! Redis Streams consumer for user events.
//!
//! Reads through a consumer group so that entries stay pending until they are
//! acknowledged. Entries left pending by a crash or a failing handler are
//! re-read from the group's pending list (id `0`) before new entries (`>`).

use std::sync::Arc;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::streams::{StreamId, StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::{ensure_consumer_group, wait, FIELD_PAYLOAD, FIELD_TYPE};
use crate::application::events::EventDispatcher;
use crate::config::EventSettings;
use crate::infrastructure::metrics;

/// What to do with a stream entry after handling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Handler succeeded.
    Applied,
    /// Entry can never succeed (unknown type, bad payload); drop it.
    Skipped,
    /// Transient failure; leave pending for redelivery.
    Retry,
}

impl Disposition {
    pub fn should_ack(&self) -> bool {
        !matches!(self, Disposition::Retry)
    }

    fn as_str(&self) -> &'static str {
        match self {
            Disposition::Applied => "applied",
            Disposition::Skipped => "skipped",
            Disposition::Retry => "failed",
        }
    }
}

/// Route one entry's fields through the dispatcher.
pub async fn handle_entry(
    dispatcher: &EventDispatcher,
    event_type: Option<&str>,
    payload: Option<&str>,
) -> Disposition {
    let (Some(event_type), Some(payload)) = (event_type, payload) else {
        warn!("Stream entry missing type or payload, skipping");
        return Disposition::Skipped;
    };

    match dispatcher.dispatch(event_type, payload).await {
        Ok(()) => Disposition::Applied,
        Err(e) if e.is_retryable() => {
            error!(event_type, error = %e, "Event handler failed, leaving pending");
            Disposition::Retry
        }
        Err(e) => {
            warn!(event_type, error = %e, "Event rejected, skipping");
            Disposition::Skipped
        }
    }
}

/// Consumer-group reader feeding the event dispatcher.
pub struct StreamConsumer {
    conn: ConnectionManager,
    settings: EventSettings,
    dispatcher: Arc<EventDispatcher>,
}

impl StreamConsumer {
    pub fn new(
        conn: ConnectionManager,
        settings: EventSettings,
        dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            conn,
            settings,
            dispatcher,
        }
    }

    /// Consume until `shutdown` flips to `true`. Stops between batches.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), redis::RedisError> {
        ensure_consumer_group(&mut self.conn, &self.settings.stream, &self.settings.group).await?;

        info!(
            stream = %self.settings.stream,
            group = %self.settings.group,
            consumer = %self.settings.consumer,
            "Event consumer started"
        );

        let idle = Duration::from_millis(self.settings.poll_interval_ms);
        let mut backlog = true;

        while !*shutdown.borrow() {
            let start_id = if backlog { "0" } else { ">" };

            let entries = match self.read_batch(start_id).await {
                Ok(entries) => entries,
                Err(e) => {
                    error!(error = %e, "Failed to read user event stream");
                    wait(idle, &mut shutdown).await;
                    continue;
                }
            };

            if entries.is_empty() {
                if backlog {
                    backlog = false;
                } else {
                    wait(idle, &mut shutdown).await;
                    backlog = true;
                }
                continue;
            }

            let mut all_acked = true;
            for entry in entries {
                all_acked &= self.process(entry).await;
            }

            if backlog && !all_acked {
                // Failed entries stay pending and are retried after new ones.
                backlog = false;
                wait(idle, &mut shutdown).await;
            }
        }

        info!("Event consumer stopped");
        Ok(())
    }

    async fn read_batch(&mut self, start_id: &str) -> Result<Vec<StreamId>, redis::RedisError> {
        let options = StreamReadOptions::default()
            .group(&self.settings.group, &self.settings.consumer)
            .count(self.settings.batch_size);

        let reply: Option<StreamReadReply> = self
            .conn
            .xread_options(&[&self.settings.stream], &[start_id], &options)
            .await?;

        Ok(reply
            .map(|r| r.keys.into_iter().flat_map(|key| key.ids).collect())
            .unwrap_or_default())
    }

    /// Handle one entry; returns whether it was acknowledged.
    async fn process(&mut self, entry: StreamId) -> bool {
        let event_type: Option<String> = entry.get(FIELD_TYPE);
        let payload: Option<String> = entry.get(FIELD_PAYLOAD);

        let disposition =
            handle_entry(&self.dispatcher, event_type.as_deref(), payload.as_deref()).await;

        metrics::record_event_processed(
            event_type.as_deref().unwrap_or("unknown"),
            disposition.as_str(),
        );

        if !disposition.should_ack() {
            return false;
        }

        let acked: Result<i64, redis::RedisError> = self
            .conn
            .xack(&self.settings.stream, &self.settings.group, &[&entry.id])
            .await;

        match acked {
            Ok(_) => {
                debug!(entry_id = %entry.id, "Event acknowledged");
                true
            }
            Err(e) => {
                error!(entry_id = %entry.id, error = %e, "Failed to acknowledge event");
                false
            }
        }
    }
}
