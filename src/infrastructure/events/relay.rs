//! Outbox relay.
//!
//! Moves events from the user service outbox onto the bus. An entry is only
//! removed after it has been published, so a bus outage delays events but
//! never loses them. A crash between publish and remove publishes the entry
//! again, which consumers already tolerate.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use super::wait;
use crate::domain::{EventPublisher, OutboxRepository};
use crate::shared::error::AppError;

/// Polls the outbox and publishes what it finds, oldest first.
pub struct OutboxRelay<O, P>
where
    O: OutboxRepository,
    P: EventPublisher,
{
    outbox: Arc<O>,
    publisher: Arc<P>,
    batch_size: i64,
    interval: Duration,
}

impl<O, P> OutboxRelay<O, P>
where
    O: OutboxRepository,
    P: EventPublisher,
{
    pub fn new(outbox: Arc<O>, publisher: Arc<P>, batch_size: usize, interval: Duration) -> Self {
        Self {
            outbox,
            publisher,
            batch_size: i64::try_from(batch_size).unwrap_or(i64::MAX),
            interval,
        }
    }

    /// Publish one batch. Stops at the first failure so later events never
    /// overtake an earlier one; returns how many entries were relayed.
    pub async fn relay_once(&self) -> Result<usize, AppError> {
        let entries = self.outbox.pending(self.batch_size).await?;

        let mut relayed = 0;
        for entry in entries {
            self.publisher.publish(&entry.event).await?;
            self.outbox.remove(entry.seq).await?;
            debug!(seq = entry.seq, event_type = entry.event.event_type(), "Outbox entry relayed");
            relayed += 1;
        }

        Ok(relayed)
    }

    /// Relay until `shutdown` flips to `true`. Full batches are followed
    /// immediately by the next one.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("Outbox relay started");

        while !*shutdown.borrow() {
            match self.relay_once().await {
                Ok(n) if n as i64 == self.batch_size => continue,
                Ok(_) => {}
                Err(e) => error!(error = %e, "Outbox relay failed, retrying"),
            }
            wait(self.interval, &mut shutdown).await;
        }

        info!("Outbox relay stopped");
    }
}
