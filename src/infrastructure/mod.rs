//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - The user event bus (Redis Streams)
//! - Prometheus metrics

pub mod database;
pub mod events;
pub mod metrics;
pub mod repositories;
