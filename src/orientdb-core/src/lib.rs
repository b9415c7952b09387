//! OrientDB REST Core Library
//!
//! Shared building blocks for talking to an OrientDB server over its HTTP
//! interface:
//! - Client configuration
//! - Endpoint and URL shaping
//! - Response and identifier models

pub mod config;
pub mod endpoint;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use endpoint::{Endpoint, Method, DEFAULT_FETCH_LIMIT};
pub use models::*;
