//! User Repository Implementation
//!
//! PostgreSQL implementation of the UserRepository trait.
//! Maps between the database schema and domain User entity. Account creation
//! and deletion write their lifecycle event to the outbox in the same
//! transaction.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::outbox_repository::enqueue;
use crate::domain::{Role, RoleType, User, UserEvent, UserRepository};
use crate::infrastructure::database::with_transaction;
use crate::shared::error::AppError;

/// Database row for a user joined with its role.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    password: Vec<u8>,
    salt: Vec<u8>,
    role_id: Uuid,
    role: String,
}

impl UserRow {
    /// Convert database row to domain User entity.
    fn into_user(self) -> Result<User, AppError> {
        let role_type = RoleType::parse(&self.role)
            .ok_or_else(|| AppError::Internal(format!("Unknown role in database: {}", self.role)))?;

        Ok(User {
            id: self.user_id,
            email: self.email,
            password: self.password,
            salt: self.salt,
            role: Role {
                id: self.role_id,
                role_type,
            },
        })
    }
}

const SELECT_USER: &str = r#"
    SELECT u.user_id, u.email, u.password, u.salt, u.role_id, r.role
    FROM users u
    JOIN roles r ON r.role_id = u.role_id
"#;

/// PostgreSQL user repository implementation.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.email = $1", SELECT_USER))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{} ORDER BY u.email", SELECT_USER))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn has_any(&self) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users)")
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Insert a user; the unique email index decides races.
    async fn create(&self, user: &User, event: &UserEvent) -> Result<bool, AppError> {
        with_transaction(&self.pool, |mut tx| async move {
            let inserted: Option<Uuid> = sqlx::query_scalar(
                r#"
                INSERT INTO users (user_id, email, password, salt, role_id)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (email) DO NOTHING
                RETURNING user_id
                "#,
            )
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.salt)
            .bind(user.role.id)
            .fetch_optional(tx.conn())
            .await?;

            if inserted.is_some() {
                enqueue(tx.conn(), event).await?;
            }

            Ok::<_, AppError>((inserted.is_some(), tx))
        })
        .await
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        password: &[u8],
        salt: &[u8],
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password = $2, salt = $3 WHERE user_id = $1")
            .bind(id)
            .bind(password)
            .bind(salt)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid, event: &UserEvent) -> Result<bool, AppError> {
        with_transaction(&self.pool, |mut tx| async move {
            let deleted = sqlx::query("DELETE FROM users WHERE user_id = $1")
                .bind(id)
                .execute(tx.conn())
                .await?
                .rows_affected()
                > 0;

            if deleted {
                enqueue(tx.conn(), event).await?;
            }

            Ok::<_, AppError>((deleted, tx))
        })
        .await
    }
}
