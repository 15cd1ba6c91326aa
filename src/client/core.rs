use crate::client::endpoint::interpolate;
use crate::logging::{noop_sink, LogLevel, LogSink};
use crate::transport::{HttpTransport, Transport, TransportError, TransportResponse};
use crate::types::{ApiRequest, ApiResponse, Params, RequestBody, ResponseBody};
use crate::{ApiError, Result};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Base API path, prepended to every endpoint.
pub const API_PATH: &str = "/api/v2";

/// Auth credential, rendered into the Authorization header.
///
/// A single slot: setting a token replaces a previously set key and the
/// other way round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Auth {
    Token(String),
    Key(String),
}

impl Auth {
    pub(crate) fn token(person_id: u64, token: &str) -> Self {
        Auth::Token(format!("{}:{}", person_id, token))
    }

    pub(crate) fn key(person_id: u64, key: &str) -> Self {
        Auth::Key(format!("{}:{}", person_id, key))
    }

    fn header_value(&self) -> String {
        match self {
            Auth::Token(credential) => format!("token {}", credential),
            Auth::Key(credential) => format!("key {}", credential),
        }
    }
}

/// Last request, raw response, and failure, kept for post-hoc inspection.
///
/// Overwritten on every call. Under concurrent calls this is last write
/// wins; rely on per-call return values, not the snapshot.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub request: Option<ApiRequest>,
    pub response: Option<TransportResponse>,
    /// Rendered form of the failure. Populated only when the call failed.
    pub error: Option<String>,
}

/// Makes requests to the helpdesk API.
///
/// Holds the base URL, auth credential, default headers, transport, and
/// log sink. Request methods take `&self`; configuration setters take
/// `&mut self` and chain.
pub struct HelpdeskClient {
    pub(crate) helpdesk_url: String,
    pub(crate) auth: Option<Auth>,
    pub(crate) default_headers: HeaderMap,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) log: Arc<dyn LogSink>,
    pub(crate) diagnostics: Mutex<Diagnostics>,
}

impl std::fmt::Debug for HelpdeskClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelpdeskClient")
            .field("helpdesk_url", &self.helpdesk_url)
            .field("auth", &self.auth)
            .field("default_headers", &self.default_headers)
            .field("transport", &"<dyn Transport>")
            .field("log", &"<dyn LogSink>")
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

impl HelpdeskClient {
    /// Create a client with the bundled [`HttpTransport`] and a no-op
    /// log sink.
    pub fn new(helpdesk_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            helpdesk_url: trim_helpdesk_url(helpdesk_url.into()),
            auth: None,
            default_headers: HeaderMap::new(),
            transport: Arc::new(HttpTransport::new()?),
            log: noop_sink(),
            diagnostics: Mutex::new(Diagnostics::default()),
        })
    }

    pub fn builder() -> crate::client::builder::HelpdeskClientBuilder {
        crate::client::builder::HelpdeskClientBuilder::new()
    }

    pub fn helpdesk_url(&self) -> &str {
        &self.helpdesk_url
    }

    /// Set the base helpdesk URL. A trailing `/` is stripped.
    pub fn set_helpdesk_url(&mut self, helpdesk_url: impl Into<String>) -> &mut Self {
        self.helpdesk_url = trim_helpdesk_url(helpdesk_url.into());
        self
    }

    /// Authenticate with a person token. Replaces any credential set
    /// earlier, key or token.
    pub fn set_auth_token(&mut self, person_id: u64, token: &str) -> &mut Self {
        self.auth = Some(Auth::token(person_id, token));
        self
    }

    /// Authenticate with an API key. Replaces any credential set earlier,
    /// key or token.
    pub fn set_auth_key(&mut self, person_id: u64, key: &str) -> &mut Self {
        self.auth = Some(Auth::key(person_id, key));
        self
    }

    /// Add a header sent with every request.
    pub fn set_default_header(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::Configuration(format!("invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::Configuration(format!("invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) -> &mut Self {
        self.transport = transport;
        self
    }

    pub fn set_log_sink(&mut self, sink: Arc<dyn LogSink>) -> &mut Self {
        self.log = sink;
        self
    }

    /// Snapshot of the last call. Debug aid only; see [`Diagnostics`] for
    /// the concurrency caveat.
    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics.lock().unwrap().clone()
    }

    pub async fn get(&self, endpoint: &str, params: Params) -> Result<ResponseBody> {
        self.request(Method::GET, endpoint, RequestBody::Empty, params, HeaderMap::new())
            .await
    }

    pub async fn post(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
        params: Params,
    ) -> Result<ResponseBody> {
        self.request(Method::POST, endpoint, body, params, HeaderMap::new())
            .await
    }

    pub async fn put(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
        params: Params,
    ) -> Result<ResponseBody> {
        self.request(Method::PUT, endpoint, body, params, HeaderMap::new())
            .await
    }

    pub async fn delete(&self, endpoint: &str, params: Params) -> Result<ResponseBody> {
        self.request(Method::DELETE, endpoint, RequestBody::Empty, params, HeaderMap::new())
            .await
    }

    pub fn get_blocking(&self, endpoint: &str, params: Params) -> Result<ResponseBody> {
        self.request_blocking(Method::GET, endpoint, RequestBody::Empty, params, HeaderMap::new())
    }

    pub fn post_blocking(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
        params: Params,
    ) -> Result<ResponseBody> {
        self.request_blocking(Method::POST, endpoint, body, params, HeaderMap::new())
    }

    pub fn put_blocking(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
        params: Params,
    ) -> Result<ResponseBody> {
        self.request_blocking(Method::PUT, endpoint, body, params, HeaderMap::new())
    }

    pub fn delete_blocking(&self, endpoint: &str, params: Params) -> Result<ResponseBody> {
        self.request_blocking(Method::DELETE, endpoint, RequestBody::Empty, params, HeaderMap::new())
    }

    /// Build and dispatch a request, then decode the outcome.
    ///
    /// The endpoint is first resolved through
    /// [`interpolate`](crate::client::endpoint::interpolate) with `params`;
    /// `extra_headers` overlay the defaults for this call only.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: impl Into<RequestBody>,
        params: Params,
        extra_headers: HeaderMap,
    ) -> Result<ResponseBody> {
        let request = self.prepare(method, endpoint, body.into(), params, extra_headers)?;
        let outcome = self.transport.send(&request).await;
        self.conclude(outcome)
    }

    /// Blocking form of [`request`](HelpdeskClient::request) with identical
    /// semantics. Must not be called from inside an async runtime.
    pub fn request_blocking(
        &self,
        method: Method,
        endpoint: &str,
        body: impl Into<RequestBody>,
        params: Params,
        extra_headers: HeaderMap,
    ) -> Result<ResponseBody> {
        let request = self.prepare(method, endpoint, body.into(), params, extra_headers)?;
        let outcome = self.transport.send_blocking(&request);
        self.conclude(outcome)
    }

    /// Resolve the endpoint, merge headers, log, and reset the snapshot.
    fn prepare(
        &self,
        method: Method,
        endpoint: &str,
        body: RequestBody,
        params: Params,
        extra_headers: HeaderMap,
    ) -> Result<ApiRequest> {
        let resolved = interpolate(endpoint, params);
        let url = format!(
            "{}{}/{}",
            self.helpdesk_url,
            API_PATH,
            resolved.trim_matches('/')
        );

        let mut headers = self.default_headers.clone();
        for (name, value) in extra_headers.iter() {
            headers.insert(name, value.clone());
        }
        if let Some(auth) = &self.auth {
            // An Authorization header supplied explicitly wins over the
            // configured credential.
            if !headers.contains_key(AUTHORIZATION) {
                let value = HeaderValue::from_str(&auth.header_value()).map_err(|e| {
                    ApiError::Configuration(format!("invalid authorization header: {}", e))
                })?;
                headers.insert(AUTHORIZATION, value);
            }
        }

        let request = ApiRequest {
            method,
            url,
            headers,
            body,
        };

        self.log.log(
            LogLevel::Debug,
            &format!("HelpdeskClient: {} {}", request.method, request.url),
            &log_context(&request),
        );

        let mut diagnostics = self.diagnostics.lock().unwrap();
        *diagnostics = Diagnostics {
            request: Some(request.clone()),
            response: None,
            error: None,
        };
        drop(diagnostics);

        Ok(request)
    }

    /// Map the transport outcome to a decoded body or a typed error and
    /// record the snapshot.
    fn conclude(
        &self,
        outcome: std::result::Result<TransportResponse, TransportError>,
    ) -> Result<ResponseBody> {
        match outcome {
            Ok(response) => {
                let body = response.body.clone();
                self.diagnostics.lock().unwrap().response = Some(response);
                Ok(decode_response(body))
            }
            Err(TransportError::Status(response)) => {
                let error = decode_error(&response.body);
                let mut diagnostics = self.diagnostics.lock().unwrap();
                diagnostics.response = Some(response);
                diagnostics.error = Some(error.to_string());
                drop(diagnostics);
                Err(error)
            }
            Err(other) => {
                let error = ApiError::Transport(other);
                self.diagnostics.lock().unwrap().error = Some(error.to_string());
                Err(error)
            }
        }
    }
}

pub(crate) fn trim_helpdesk_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn log_context(request: &ApiRequest) -> Value {
    let headers: serde_json::Map<String, Value> = request
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            )
        })
        .collect();

    let body = match &request.body {
        RequestBody::Empty => Value::Null,
        RequestBody::Scalar(s) => json!(s),
        RequestBody::Json(value) => value.clone(),
        RequestBody::Multipart(parts) => json!({
            "multipart": parts.iter().map(|p| p.name.clone()).collect::<Vec<_>>(),
        }),
    };

    json!({ "headers": headers, "body": body })
}

/// Decode a successful response body.
///
/// Invalid JSON and JSON `null` pass the body through unchanged; a JSON
/// value that is not the full `{data, meta, linked}` envelope is returned
/// as loose JSON.
fn decode_response(body: Bytes) -> ResponseBody {
    let decoded: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => return ResponseBody::Raw(body),
    };
    if decoded.is_null() {
        return ResponseBody::Raw(body);
    }

    match decoded {
        Value::Object(mut map)
            if map.contains_key("data") && map.contains_key("meta") && map.contains_key("linked") =>
        {
            // Fields are moved out verbatim.
            ResponseBody::Envelope(ApiResponse {
                data: map.remove("data").unwrap_or(Value::Null),
                meta: map.remove("meta").unwrap_or(Value::Null),
                linked: map.remove("linked").unwrap_or(Value::Null),
            })
        }
        other => ResponseBody::Json(other),
    }
}

/// Decode an error response body into the error taxonomy.
fn decode_error(body: &[u8]) -> ApiError {
    let decoded: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => return ApiError::MalformedResponse,
    };
    let Some(map) = decoded.as_object() else {
        return ApiError::MalformedResponse;
    };

    let status = match map.get("status") {
        Some(Value::Number(n)) => n.as_u64().and_then(|s| u16::try_from(s).ok()),
        Some(Value::String(s)) => s.parse::<u16>().ok(),
        _ => None,
    };
    let message = map.get("message").and_then(Value::as_str);

    let (Some(status), Some(message)) = (status, message) else {
        return ApiError::MalformedResponse;
    };
    let message = message.to_string();

    match status {
        401 => ApiError::Authentication { status, message },
        403 => ApiError::AccessDenied { status, message },
        404 => ApiError::NotFound { status, message },
        _ => ApiError::Api { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_fields_are_taken_verbatim() {
        let body = Bytes::from(
            json!({
                "data": [{"id": 101, "title": "Exercitationem illo quod et provident"}],
                "meta": {"count": 1},
                "linked": []
            })
            .to_string(),
        );

        let ResponseBody::Envelope(envelope) = decode_response(body) else {
            panic!("expected envelope");
        };
        assert_eq!(
            envelope.data,
            json!([{"id": 101, "title": "Exercitationem illo quod et provident"}])
        );
        assert_eq!(envelope.meta, json!({"count": 1}));
        assert_eq!(envelope.linked, json!([]));
    }

    #[test]
    fn json_without_full_envelope_is_loose() {
        let body = Bytes::from(json!({"data": [], "meta": {}}).to_string());
        assert_eq!(
            decode_response(body),
            ResponseBody::Json(json!({"data": [], "meta": {}}))
        );
    }

    #[test]
    fn non_json_body_is_returned_unchanged() {
        let body = Bytes::from_static(b"<html>maintenance</html>");
        assert_eq!(decode_response(body.clone()), ResponseBody::Raw(body));
    }

    #[test]
    fn json_null_body_is_returned_unchanged() {
        let body = Bytes::from_static(b"null");
        assert_eq!(decode_response(body.clone()), ResponseBody::Raw(body));
    }

    #[test]
    fn error_statuses_map_to_the_taxonomy() {
        let error = decode_error(br#"{"status": 401, "message": "Bad token"}"#);
        assert!(matches!(
            error,
            ApiError::Authentication { status: 401, ref message } if message == "Bad token"
        ));

        let error = decode_error(br#"{"status": 403, "message": "No"}"#);
        assert!(matches!(error, ApiError::AccessDenied { status: 403, .. }));

        let error = decode_error(br#"{"status": 404, "message": "Not found"}"#);
        assert!(matches!(
            error,
            ApiError::NotFound { status: 404, ref message } if message == "Not found"
        ));

        let error = decode_error(br#"{"status": 500, "message": "Boom"}"#);
        assert!(matches!(error, ApiError::Api { status: 500, .. }));
    }

    #[test]
    fn numeric_string_status_is_cast() {
        let error = decode_error(br#"{"status": "404", "message": "Not found"}"#);
        assert!(matches!(error, ApiError::NotFound { status: 404, .. }));
    }

    #[test]
    fn missing_fields_are_malformed() {
        assert!(matches!(
            decode_error(br#"{"message": "no status"}"#),
            ApiError::MalformedResponse
        ));
        assert!(matches!(
            decode_error(br#"{"status": 500}"#),
            ApiError::MalformedResponse
        ));
        assert!(matches!(decode_error(b"not json"), ApiError::MalformedResponse));
        assert!(matches!(decode_error(br#"["status"]"#), ApiError::MalformedResponse));
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        assert_eq!(
            trim_helpdesk_url("https://example.deskpro-dev.com/".to_string()),
            "https://example.deskpro-dev.com"
        );
        assert_eq!(
            trim_helpdesk_url("https://example.deskpro-dev.com".to_string()),
            "https://example.deskpro-dev.com"
        );
    }

    #[test]
    fn auth_header_forms() {
        assert_eq!(Auth::token(5, "abc").header_value(), "token 5:abc");
        assert_eq!(Auth::key(5, "abc").header_value(), "key 5:abc");
    }
}
