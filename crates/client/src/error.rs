//! Error types for the catalog client.

use thiserror::Error;

/// Errors surfaced to the user by the client. `Display` is the message a
/// front end shows inline or in a toast.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a usable response
    #[error("{message}")]
    Transport {
        message: &'static str,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The server answered with `success: false`
    #[error("{message}")]
    Api { status: u16, message: String },

    /// A draft failed the client-side check before any request was made
    #[error("{0}")]
    Invalid(String),

    /// Invalid API base URL
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
