//! Outbox Repository Implementation
//!
//! The `outbox` table holds user events committed together with the account
//! change that produced them, until the relay has appended them to the bus.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use crate::domain::{OutboxEntry, OutboxRepository, UserEvent};
use crate::shared::error::AppError;

/// Queue `event` on the caller's connection, normally inside its transaction.
pub(crate) async fn enqueue(conn: &mut PgConnection, event: &UserEvent) -> Result<(), AppError> {
    let payload = event
        .payload()
        .map_err(|e| AppError::Internal(format!("Failed to serialize event: {}", e)))?;

    sqlx::query("INSERT INTO outbox (event_type, payload) VALUES ($1, $2)")
        .bind(event.event_type())
        .bind(payload)
        .execute(conn)
        .await?;

    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct OutboxRow {
    seq: i64,
    event_type: String,
    payload: String,
}

impl OutboxRow {
    fn into_entry(self) -> Result<OutboxEntry, AppError> {
        Ok(OutboxEntry {
            seq: self.seq,
            event: UserEvent::from_wire(&self.event_type, &self.payload)?,
        })
    }
}

/// PostgreSQL outbox repository implementation.
#[derive(Clone)]
pub struct PgOutboxRepository {
    pool: PgPool,
}

impl PgOutboxRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutboxRepository for PgOutboxRepository {
    async fn pending(&self, limit: i64) -> Result<Vec<OutboxEntry>, AppError> {
        let rows = sqlx::query_as::<_, OutboxRow>(
            "SELECT seq, event_type, payload FROM outbox ORDER BY seq LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OutboxRow::into_entry).collect()
    }

    async fn remove(&self, seq: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM outbox WHERE seq = $1")
            .bind(seq)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
