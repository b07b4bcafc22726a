//! Error handling for the RemWaste API client

use std::fmt;
use thiserror::Error;

/// Unified error type for the RemWaste API client
#[derive(Error, Debug)]
pub enum Error {
    /// Network, timeout or other transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The server answered with a non-2xx status and failure was not allowed
    #[error("Request failed with status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response did not match the expected contract
    #[error("Contract violation: {0}")]
    Contract(String),

    /// The health probe never answered 200
    #[error("Health check failed: {status} - Service may be sleeping or unavailable")]
    ServiceUnavailable { status: u16 },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new contract violation
    pub fn contract<T: fmt::Display>(msg: T) -> Self {
        Error::Contract(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Whether the error came from the network layer (connect failure or timeout)
    pub fn is_network(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
