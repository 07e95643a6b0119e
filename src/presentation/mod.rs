//! Presentation Layer
//!
//! HTTP routes, middleware and the gateway proxy.

pub mod gateway;
pub mod http;
pub mod middleware;
