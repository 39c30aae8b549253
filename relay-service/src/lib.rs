//! relay-service: forwards chat, image and file-analysis requests to a
//! generative AI provider and renders the replies for display.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod presentation;
pub mod services;
pub mod startup;
