//! Event Bus Module
//!
//! User lifecycle events travel over a Redis Stream. The user service drains
//! its outbox with [`OutboxRelay`], which appends entries through
//! [`RedisEventPublisher`]; each message service instance reads them through a
//! consumer group with [`StreamConsumer`].
//!
//! Every stream entry carries two fields:
//!
//! ```text
//! type    = "UserRegistered" | "UserDeleted"
//! payload = {"id": "...", "email": "..."} | {"id": "..."}
//! ```

mod consumer;
mod publisher;
mod relay;

pub use consumer::{Disposition, StreamConsumer};
pub use publisher::RedisEventPublisher;
pub use relay::OutboxRelay;

use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::watch;
use tracing::{info, instrument};

use crate::config::RedisSettings;

/// Stream entry field holding the event type.
pub const FIELD_TYPE: &str = "type";

/// Stream entry field holding the JSON payload.
pub const FIELD_PAYLOAD: &str = "payload";

/// Creates a Redis connection manager with automatic reconnection.
#[instrument(skip(settings), fields(url = %settings.url))]
pub async fn create_redis_client(
    settings: &RedisSettings,
) -> Result<ConnectionManager, redis::RedisError> {
    info!("Connecting to Redis...");
    let client = Client::open(settings.url.as_str())?;
    let manager = ConnectionManager::new(client).await?;
    info!("Redis connection established");
    Ok(manager)
}

/// Create the consumer group (and the stream) unless it already exists.
pub async fn ensure_consumer_group(
    conn: &mut ConnectionManager,
    stream: &str,
    group: &str,
) -> Result<(), redis::RedisError> {
    let created: Result<(), redis::RedisError> =
        conn.xgroup_create_mkstream(stream, group, "0").await;

    match created {
        Ok(()) => {
            info!(stream, group, "Consumer group created");
            Ok(())
        }
        Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
        Err(e) => Err(e),
    }
}

/// Sleep for `duration` unless shutdown is signalled first.
pub(crate) async fn wait(duration: Duration, shutdown: &mut watch::Receiver<bool>) {
    tokio::select! {
        _ = tokio::time::sleep(duration) => {}
        _ = shutdown.changed() => {}
    }
}
