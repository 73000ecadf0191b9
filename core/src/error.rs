//! Error types for the Trello client.
//!
//! # Design
//! Four kinds of failure exist and none of them is retried: the request URL
//! could not be built, the transport failed, the body did not decode, or the
//! remote service answered with a non-2xx status. `MissingCredentials` only
//! comes out of `Client::from_env`.

use thiserror::Error;

/// Errors returned by the client, its services and the entity handles.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request URL could not be constructed.
    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Network, DNS or connection failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body is not JSON of the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The server answered outside the 200..=299 range.
    #[error("bad response code: {status} {reason}")]
    Status { status: u16, reason: String },

    /// A required environment variable was unset or blank.
    #[error("missing credentials: {0} is not set")]
    MissingCredentials(&'static str),
}

impl ApiError {
    /// Numeric HTTP status for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
