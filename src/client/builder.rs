use crate::client::core::{trim_helpdesk_url, Auth, Diagnostics, HelpdeskClient};
use crate::logging::{noop_sink, LogSink};
use crate::transport::{HttpTransport, Transport};
use crate::{ApiError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::{Arc, Mutex};

/// Builder for clients with custom configuration.
///
/// Keep this surface small; everything here is also reachable through the
/// client's setters.
pub struct HelpdeskClientBuilder {
    helpdesk_url: Option<String>,
    auth: Option<Auth>,
    default_headers: Vec<(String, String)>,
    transport: Option<Arc<dyn Transport>>,
    log: Option<Arc<dyn LogSink>>,
}

impl HelpdeskClientBuilder {
    pub fn new() -> Self {
        Self {
            helpdesk_url: None,
            auth: None,
            default_headers: Vec::new(),
            transport: None,
            log: None,
        }
    }

    /// Base helpdesk URL. Required.
    pub fn helpdesk_url(mut self, url: impl Into<String>) -> Self {
        self.helpdesk_url = Some(url.into());
        self
    }

    /// Authenticate with a person token. Last credential set wins.
    pub fn auth_token(mut self, person_id: u64, token: &str) -> Self {
        self.auth = Some(Auth::token(person_id, token));
        self
    }

    /// Authenticate with an API key. Last credential set wins.
    pub fn auth_key(mut self, person_id: u64, key: &str) -> Self {
        self.auth = Some(Auth::key(person_id, key));
        self
    }

    /// Header sent with every request. Validated at build time.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Inject a transport. Default is the bundled [`HttpTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Inject a log sink. Default is a no-op sink.
    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log = Some(sink);
        self
    }

    pub fn build(self) -> Result<HelpdeskClient> {
        let helpdesk_url = self
            .helpdesk_url
            .ok_or_else(|| ApiError::Configuration("helpdesk URL must be provided".to_string()))?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ApiError::Configuration(format!("invalid header name '{}': {}", name, e))
            })?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::Configuration(format!("invalid header value: {}", e)))?;
            default_headers.insert(name, value);
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };

        Ok(HelpdeskClient {
            helpdesk_url: trim_helpdesk_url(helpdesk_url),
            auth: self.auth,
            default_headers,
            transport,
            log: self.log.unwrap_or_else(noop_sink),
            diagnostics: Mutex::new(Diagnostics::default()),
        })
    }
}

impl Default for HelpdeskClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
