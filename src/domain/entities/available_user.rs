//! AvailableUser entity and repository trait.
//!
//! The message service's local projection of users, maintained from
//! `UserRegistered` / `UserDeleted` events. Maps to the message service's
//! `users` table.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Replica row: just enough to validate a recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableUser {
    pub id: Uuid,
    pub email: String,
}

/// Repository for the replica table.
///
/// Writes must be idempotent and order-independent: events are delivered at
/// least once, and a retried event can arrive after a later one. A deletion
/// therefore leaves a tombstone, and a user id once deleted never comes back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailableUserRepository: Send + Sync {
    /// Insert or refresh the row keyed by `user.id`, replacing any other row
    /// holding the same email. Returns `false` without writing when the id
    /// has been deleted.
    async fn upsert(&self, user: &AvailableUser) -> Result<bool, AppError>;

    /// Remove the row if present and tombstone the id. Returns whether a row
    /// was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Find the replica row holding `email`. Emails are unique.
    async fn find_by_email(&self, email: &str) -> Result<Option<AvailableUser>, AppError>;
}
