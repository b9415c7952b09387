//! OrientDB REST Client Library
//!
//! HTTP client for a single OrientDB database session: connect, SQL queries,
//! record loads, class and cluster introspection, commands and disconnect.

mod client;
mod transport;

pub use client::DatabaseClient;
pub use orientdb_core::{Config, DatabasePath, Operation, ResponseBody, SessionField};
pub use transport::{Credentials, HttpTransport, Request, Transport, TransportFailure};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server (or the connection to it) rejected the request. The body is
    /// the raw response text, or the transport error when no response arrived.
    #[error("{operation} error: {body}")]
    RequestFailure { operation: Operation, body: String },

    #[error("Database is closed")]
    DatabaseClosed,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    pub fn request_failure(operation: Operation, body: impl Into<String>) -> Self {
        ClientError::RequestFailure {
            operation,
            body: body.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
