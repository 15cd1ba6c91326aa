//! Error taxonomy for API calls.
//!
//! Errors decoded from the API's `{status, message}` error envelope keep
//! the numeric status so callers can branch on recoverability. Everything
//! the library surfaces funnels into [`ApiError`]; nothing is retried or
//! swallowed internally.

use crate::transport::TransportError;
use thiserror::Error;

/// Unified error type for API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Error envelope with status 401. Re-authenticate and retry at the
    /// application layer if appropriate.
    #[error("authentication failed: {message}")]
    Authentication { status: u16, message: String },

    /// Error envelope with status 403.
    #[error("access denied: {message}")]
    AccessDenied { status: u16, message: String },

    /// Error envelope with status 404.
    #[error("not found: {message}")]
    NotFound { status: u16, message: String },

    /// Any other decodable error envelope.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The error response body could not be decoded, or the decoded value
    /// is missing the required `status` or `message` field.
    #[error("could not JSON decode API response")]
    MalformedResponse,

    /// Connection-level failure; no response envelope is available.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The client or a request could not be built.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Status code carried by the decoded error envelope, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication { status, .. }
            | ApiError::AccessDenied { status, .. }
            | ApiError::NotFound { status, .. }
            | ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message carried by the decoded error envelope, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Authentication { message, .. }
            | ApiError::AccessDenied { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}
