//! # Domain Entities
//!
//! Core domain entities of both services. All entities map directly to their
//! corresponding database tables.
//!
//! ## User service
//!
//! - **User**: account with credentials and role
//! - **Role**: seeded reference data (Administrator, User)
//!
//! ## Message service
//!
//! - **Message**: a direct message between two users
//! - **AvailableUser**: local replica of users fed by events
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod available_user;
mod message;
mod role;
mod user;

pub use available_user::{AvailableUser, AvailableUserRepository};
pub use message::{Message, MessageRepository};
pub use role::{Role, RoleRepository, RoleType};
pub use user::{User, UserRepository};

#[cfg(test)]
pub use available_user::MockAvailableUserRepository;
#[cfg(test)]
pub use message::MockMessageRepository;
#[cfg(test)]
pub use role::MockRoleRepository;
#[cfg(test)]
pub use user::MockUserRepository;
