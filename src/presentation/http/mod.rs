//! HTTP API: extractors, handlers and routers.

pub mod extractors;
pub mod handlers;
pub mod routes;
