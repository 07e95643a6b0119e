//! # Messenger Library
//!
//! Three HTTP binaries sharing one crate:
//! - **user-service**: registration, login (RS256 JWT issuance), user listing
//!   and deletion; relays user lifecycle events from an outbox to a Redis Stream
//! - **message-service**: one-to-one messages with read-once inbox retrieval;
//!   keeps a local replica of users fed by the event stream
//! - **gateway**: reverse proxy routing `/users/*` and `/messages/*`
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities, repository traits and user events
//! - **Application Layer**: Services, event handlers and DTOs
//! - **Infrastructure Layer**: PostgreSQL repositories, Redis Streams, metrics
//! - **Presentation Layer**: HTTP handlers, middleware and the gateway proxy
//!
//! ## Module Structure
//!
//! ```text
//! messenger/
//! +-- config/         Configuration management
//! +-- domain/         Entities, repository traits, events
//! +-- application/    Services, event handlers and DTOs
//! +-- infrastructure/ Database, event bus and metrics
//! +-- presentation/   Routes, middleware and gateway
//! +-- shared/         Errors and validation helpers
//! +-- startup/        Per-binary wiring
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers and gateway proxy
pub mod presentation;

// Shared utilities
pub mod shared;

// Per-binary startup and state
pub mod startup;

// Telemetry and observability
pub mod telemetry;
