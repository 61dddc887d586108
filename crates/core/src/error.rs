//! Centralized error types for the cloudlb workspace.

use thiserror::Error;

/// Top-level error enum. Variants map to failure categories.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CloudLbError {
    /// Missing or rejected credentials, or no usable catalog endpoint.
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Decoding error: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CloudLbError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type CloudLbResult<T> = Result<T, CloudLbError>;
