//! HTTP handlers for the relay service.

pub mod api;
pub mod health;
pub mod metrics;
