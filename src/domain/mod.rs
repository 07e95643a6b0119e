//! # Domain Layer
//!
//! The domain layer contains the core business types of both services.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities (User, Role, Message, AvailableUser)
//! - **events**: User lifecycle events exchanged over the event bus
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository and publisher traits define data access contracts

pub mod entities;
pub mod events;

// Re-export commonly used types
pub use entities::*;
pub use events::{
    EventPublisher, OutboxEntry, OutboxRepository, UserDeletedEvent, UserEvent, UserRegisteredEvent,
};

#[cfg(test)]
pub use events::{MockEventPublisher, MockOutboxRepository};
