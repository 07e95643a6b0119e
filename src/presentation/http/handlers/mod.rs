//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod health;
pub mod messages;
pub mod metrics;
pub mod users;
