//! User entity and repository trait.
//!
//! Maps to the `users` table of the user service.

use async_trait::async_trait;
use uuid::Uuid;

use super::role::Role;
use crate::domain::events::UserEvent;
use crate::shared::error::AppError;

/// Represents a user account.
///
/// Maps to the `users` table:
/// - user_id: UUID PRIMARY KEY
/// - email: VARCHAR(64) NOT NULL UNIQUE
/// - password: BYTEA NOT NULL (PBKDF2-HMAC-SHA512 output)
/// - salt: BYTEA NOT NULL
/// - role_id: UUID NOT NULL REFERENCES roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password: Vec<u8>,
    pub salt: Vec<u8>,
    pub role: Role,
}

/// Repository trait for User data access operations.
///
/// Implementations of this trait handle the actual database interactions.
/// The trait is defined in the domain layer to maintain dependency inversion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// List every user.
    async fn find_all(&self) -> Result<Vec<User>, AppError>;

    /// Whether at least one user has ever been stored and not deleted.
    async fn has_any(&self) -> Result<bool, AppError>;

    /// Insert a user and queue `event` in the same transaction. Returns
    /// `false` without writing either when the email is taken.
    async fn create(&self, user: &User, event: &UserEvent) -> Result<bool, AppError>;

    /// Replace the stored password hash and salt.
    async fn update_credentials(
        &self,
        id: Uuid,
        password: &[u8],
        salt: &[u8],
    ) -> Result<(), AppError>;

    /// Delete a user and queue `event` in the same transaction. Returns
    /// `false` without writing either when no row matched.
    async fn delete(&self, id: Uuid, event: &UserEvent) -> Result<bool, AppError>;
}
