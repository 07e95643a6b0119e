//! Role Repository Implementation
//!
//! PostgreSQL implementation of the RoleRepository trait. Roles are seeded by
//! the user service migration and only ever read here.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Role, RoleRepository, RoleType};
use crate::shared::error::AppError;

/// Database row representation of the roles table.
#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    role_id: Uuid,
}

/// PostgreSQL role repository implementation.
#[derive(Clone)]
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    /// Create a new PgRoleRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn find_by_type(&self, role_type: RoleType) -> Result<Option<Role>, AppError> {
        let row = sqlx::query_as::<_, RoleRow>("SELECT role_id FROM roles WHERE role = $1")
            .bind(role_type.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Role {
            id: r.role_id,
            role_type,
        }))
    }
}
