//! Helpdesk API client.
//!
//! Developer-friendly goal: keep the public surface small and predictable.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
pub mod endpoint;

pub use self::builder::HelpdeskClientBuilder;
pub use self::core::{Diagnostics, HelpdeskClient, API_PATH};
pub use self::endpoint::interpolate;
