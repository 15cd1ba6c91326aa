use super::{Transport, TransportError, TransportResponse};
use crate::types::{ApiRequest, FormPart, RequestBody};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::env;
use std::time::Duration;

/// Default transport over reqwest.
///
/// The async client is built up front; the blocking client is built on
/// first blocking call, since constructing it inside an async runtime is
/// not allowed by reqwest. The same restriction applies to
/// [`send_blocking`](Transport::send_blocking) itself.
pub struct HttpTransport {
    client: reqwest::Client,
    blocking: OnceCell<reqwest::blocking::Client>,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with the default timeout (30 s, env-overridable
    /// via `HELPDESK_HTTP_TIMEOUT_SECS`).
    pub fn new() -> Result<Self, TransportError> {
        let timeout_secs = env::var("HELPDESK_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);
        Self::with_timeout(Duration::from_secs(timeout_secs))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            blocking: OnceCell::new(),
            timeout,
        })
    }

    fn blocking_client(&self) -> Result<&reqwest::blocking::Client, TransportError> {
        self.blocking.get_or_try_init(|| {
            reqwest::blocking::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(TransportError::from)
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Scalar(value) => builder.body(value.clone()),
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(multipart_form(parts)?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        let response = TransportResponse {
            status: status.as_u16(),
            headers,
            body,
        };
        if status.is_success() {
            Ok(response)
        } else {
            Err(TransportError::Status(response))
        }
    }

    fn send_blocking(&self, request: &ApiRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .blocking_client()?
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Scalar(value) => builder.body(value.clone()),
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(blocking_multipart_form(parts)?),
        };

        let response = builder.send()?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes()?;

        let response = TransportResponse {
            status: status.as_u16(),
            headers,
            body,
        };
        if status.is_success() {
            Ok(response)
        } else {
            Err(TransportError::Status(response))
        }
    }
}

fn multipart_form(parts: &[FormPart]) -> Result<reqwest::multipart::Form, TransportError> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        let mut piece = reqwest::multipart::Part::bytes(part.contents.clone());
        if let Some(filename) = &part.filename {
            piece = piece.file_name(filename.clone());
        }
        if let Some(content_type) = &part.content_type {
            piece = piece.mime_str(content_type)?;
        }
        form = form.part(part.name.clone(), piece);
    }
    Ok(form)
}

fn blocking_multipart_form(
    parts: &[FormPart],
) -> Result<reqwest::blocking::multipart::Form, TransportError> {
    let mut form = reqwest::blocking::multipart::Form::new();
    for part in parts {
        let mut piece = reqwest::blocking::multipart::Part::bytes(part.contents.clone());
        if let Some(filename) = &part.filename {
            piece = piece.file_name(filename.clone());
        }
        if let Some(content_type) = &part.content_type {
            piece = piece.mime_str(content_type)?;
        }
        form = form.part(part.name.clone(), piece);
    }
    Ok(form)
}
