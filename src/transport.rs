//! Transport boundary.
//!
//! The client hands a fully built [`ApiRequest`](crate::types::ApiRequest)
//! to a [`Transport`] and maps the outcome; connection pooling, TLS, and
//! socket-level behavior live behind this trait. The bundled
//! [`HttpTransport`] covers production use; tests and embedders can inject
//! their own implementation.

use crate::types::ApiRequest;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use thiserror::Error;

pub mod http;
pub use http::HttpTransport;

/// Raw response as the transport saw it.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status. The response is carried
    /// along so the client can decode the error envelope.
    #[error("server returned HTTP {}", .0.status)]
    Status(TransportResponse),

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Sends built requests over the wire.
///
/// A non-2xx answer is reported as [`TransportError::Status`] with the
/// full response attached; only connection-level failures use
/// [`TransportError::Http`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<TransportResponse, TransportError>;

    /// Blocking form of [`send`](Transport::send) with identical semantics.
    fn send_blocking(&self, request: &ApiRequest) -> Result<TransportResponse, TransportError>;
}
