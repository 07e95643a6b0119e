//! Role entity and repository trait.
//!
//! Maps to the `roles` table of the user service. Rows are seeded by
//! migration and never change at runtime.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Role type matching the `roles.role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleType {
    Administrator,
    User,
}

impl RoleType {
    /// Parse the database / claim representation. Case-sensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Administrator" => Some(Self::Administrator),
            "User" => Some(Self::User),
            _ => None,
        }
    }

    /// Convert to database / claim representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrator => "Administrator",
            Self::User => "User",
        }
    }
}

impl std::fmt::Display for RoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference row from the `roles` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: Uuid,
    pub role_type: RoleType,
}

/// Repository trait for Role lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Find the seeded role row for a role type.
    async fn find_by_type(&self, role_type: RoleType) -> Result<Option<Role>, AppError>;
}
