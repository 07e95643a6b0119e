//! Available User Repository Implementation
//!
//! PostgreSQL implementation of the message service's user replica.
//! Deleted ids are kept in `deleted_users` so that a registration event
//! retried after the deletion cannot restore the row.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::{AvailableUser, AvailableUserRepository};
use crate::infrastructure::database::with_transaction;
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct AvailableUserRow {
    user_id: Uuid,
    email: String,
}

impl From<AvailableUserRow> for AvailableUser {
    fn from(row: AvailableUserRow) -> Self {
        Self {
            id: row.user_id,
            email: row.email,
        }
    }
}

/// PostgreSQL replica repository.
#[derive(Clone)]
pub struct PgAvailableUserRepository {
    pool: PgPool,
}

impl PgAvailableUserRepository {
    /// Create a new PgAvailableUserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Serialize replica writes for one user id within the current transaction.
async fn lock_user(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(())
}

#[async_trait]
impl AvailableUserRepository for PgAvailableUserRepository {
    async fn upsert(&self, user: &AvailableUser) -> Result<bool, AppError> {
        with_transaction(&self.pool, |mut tx| async move {
            lock_user(tx.conn(), user.id).await?;

            let deleted: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM deleted_users WHERE user_id = $1)",
            )
            .bind(user.id)
            .fetch_one(tx.conn())
            .await?;

            if deleted {
                return Ok::<_, AppError>((false, tx));
            }

            // Another id holding this email belongs to an account deleted
            // upstream whose event has not been applied yet.
            sqlx::query("DELETE FROM users WHERE email = $1 AND user_id <> $2")
                .bind(&user.email)
                .bind(user.id)
                .execute(tx.conn())
                .await?;

            sqlx::query(
                r#"
                INSERT INTO users (user_id, email)
                VALUES ($1, $2)
                ON CONFLICT (user_id) DO UPDATE SET email = EXCLUDED.email
                "#,
            )
            .bind(user.id)
            .bind(&user.email)
            .execute(tx.conn())
            .await?;

            Ok::<_, AppError>((true, tx))
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        with_transaction(&self.pool, |mut tx| async move {
            lock_user(tx.conn(), id).await?;

            sqlx::query("INSERT INTO deleted_users (user_id) VALUES ($1) ON CONFLICT DO NOTHING")
                .bind(id)
                .execute(tx.conn())
                .await?;

            let removed = sqlx::query("DELETE FROM users WHERE user_id = $1")
                .bind(id)
                .execute(tx.conn())
                .await?
                .rows_affected()
                > 0;

            Ok::<_, AppError>((removed, tx))
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AvailableUser>, AppError> {
        let row = sqlx::query_as::<_, AvailableUserRow>(
            "SELECT user_id, email FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AvailableUser::from))
    }
}
