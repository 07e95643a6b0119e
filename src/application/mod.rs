//! Application Layer
//!
//! Contains business logic services, event handlers and data transfer
//! objects (DTOs). This layer orchestrates the flow of data between the
//! presentation and domain layers.

pub mod dto;
pub mod events;
pub mod services;
