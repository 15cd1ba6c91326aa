//! # helpdesk-api
//!
//! Typed client for the helpdesk REST API v2. It builds authenticated
//! requests, resolves `{placeholder}` endpoint templates, serializes
//! bodies, dispatches synchronously or asynchronously, and normalizes
//! response and error envelopes into typed results.
//!
//! ## Overview
//!
//! Every call goes to `{helpdesk_url}/api/v2/{endpoint}`. Successful
//! bodies decode into the `{data, meta, linked}` envelope where present;
//! error bodies decode into a small status-keyed taxonomy
//! ([`ApiError`]). The HTTP transport and the log sink are external
//! collaborators behind narrow traits with bundled defaults.
//!
//! This layer deliberately does no rate limiting, retrying, caching, or
//! pagination traversal; callers own recovery policy.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use helpdesk_api::{HelpdeskClient, Params};
//!
//! #[tokio::main]
//! async fn main() -> helpdesk_api::Result<()> {
//!     let mut client = HelpdeskClient::new("https://example.deskpro-dev.com")?;
//!     client.set_auth_token(5, "secret-token");
//!
//!     let articles = client
//!         .get("/articles/{id}", Params::new().insert("id", 101))
//!         .await?;
//!     if let Some(envelope) = articles.envelope() {
//!         println!("{}", envelope.data);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client implementation, builder, endpoint interpolation |
//! | [`transport`] | Transport trait and the bundled reqwest transport |
//! | [`logging`] | Log sink trait, no-op default, tracing bridge |
//! | [`types`] | Requests, bodies, parameter maps, response envelopes |
//! | [`error`] | Error taxonomy |

pub mod client;
pub mod error;
pub mod logging;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{interpolate, Diagnostics, HelpdeskClient, HelpdeskClientBuilder, API_PATH};
pub use error::ApiError;
pub use logging::{noop_sink, LogLevel, LogSink, NoopLogSink, TracingLogSink};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};
pub use types::{ApiRequest, ApiResponse, FormPart, Params, RequestBody, ResponseBody};

// Method and header types are reqwest's; re-exported so callers don't
// need a direct reqwest dependency for `request()`.
pub use reqwest::header;
pub use reqwest::Method;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, ApiError>;
