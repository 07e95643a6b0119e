//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **PgUserRepository** - User accounts (user service)
//! - **PgRoleRepository** - Seeded roles (user service)
//! - **PgOutboxRepository** - Events awaiting relay (user service)
//! - **PgAvailableUserRepository** - User replica (message service)
//! - **PgMessageRepository** - Messages and inbox retrieval (message service)
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgMessageRepository, PgAvailableUserRepository};
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let message_repo = PgMessageRepository::new(pool.clone());
//!     let replica_repo = PgAvailableUserRepository::new(pool);
//! }
//! ```

pub mod available_user_repository;
pub mod message_repository;
pub mod outbox_repository;
pub mod role_repository;
pub mod user_repository;

pub use available_user_repository::PgAvailableUserRepository;
pub use message_repository::PgMessageRepository;
pub use outbox_repository::PgOutboxRepository;
pub use role_repository::PgRoleRepository;
pub use user_repository::PgUserRepository;
