//! Request-building behavior, observed through an injected transport and
//! log sink instead of a live server.

use async_trait::async_trait;
use bytes::Bytes;
use helpdesk_api::header::HeaderMap;
use helpdesk_api::{
    ApiRequest, HelpdeskClient, LogLevel, LogSink, Params, RequestBody, Transport,
    TransportError, TransportResponse,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Records every request and answers with a canned envelope.
struct CapturingTransport {
    seen: Mutex<Vec<ApiRequest>>,
}

impl CapturingTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
        })
    }

    fn reply(&self, request: &ApiRequest) -> TransportResponse {
        self.seen.lock().unwrap().push(request.clone());
        TransportResponse {
            status: 200,
            headers: HeaderMap::new(),
            body: Bytes::from(json!({"data": [], "meta": {}, "linked": {}}).to_string()),
        }
    }

    fn last(&self) -> ApiRequest {
        self.seen.lock().unwrap().last().cloned().expect("no request seen")
    }
}

#[async_trait]
impl Transport for CapturingTransport {
    async fn send(&self, request: &ApiRequest) -> Result<TransportResponse, TransportError> {
        Ok(self.reply(request))
    }

    fn send_blocking(&self, request: &ApiRequest) -> Result<TransportResponse, TransportError> {
        Ok(self.reply(request))
    }
}

struct RecordingLogSink {
    entries: Mutex<Vec<(LogLevel, String, Value)>>,
}

impl LogSink for RecordingLogSink {
    fn log(&self, level: LogLevel, message: &str, context: &Value) {
        self.entries
            .lock()
            .unwrap()
            .push((level, message.to_string(), context.clone()));
    }
}

#[test]
fn endpoint_slashes_are_trimmed_into_the_url() {
    let transport = CapturingTransport::new();
    let client = HelpdeskClient::builder()
        .helpdesk_url("http://deskpro-dev.com")
        .transport(transport.clone())
        .build()
        .unwrap();

    client.get_blocking("articles", Params::new()).unwrap();
    assert_eq!(transport.last().url, "http://deskpro-dev.com/api/v2/articles");

    client.get_blocking("/articles/", Params::new()).unwrap();
    assert_eq!(transport.last().url, "http://deskpro-dev.com/api/v2/articles");
}

#[test]
fn builder_credential_is_rendered_once() {
    let transport = CapturingTransport::new();
    let client = HelpdeskClient::builder()
        .helpdesk_url("http://deskpro-dev.com")
        .auth_token(9, "early")
        .auth_key(9, "late")
        .transport(transport.clone())
        .build()
        .unwrap();

    client.get_blocking("/articles", Params::new()).unwrap();
    let request = transport.last();
    assert_eq!(
        request.headers.get("authorization").unwrap().to_str().unwrap(),
        "key 9:late"
    );
    assert_eq!(request.headers.get_all("authorization").iter().count(), 1);
}

#[test]
fn bodies_keep_their_classification() {
    let transport = CapturingTransport::new();
    let client = HelpdeskClient::builder()
        .helpdesk_url("http://deskpro-dev.com")
        .transport(transport.clone())
        .build()
        .unwrap();

    client
        .post_blocking("/articles", json!({"title": "T"}), Params::new())
        .unwrap();
    assert_eq!(
        transport.last().body,
        RequestBody::Json(json!({"title": "T"}))
    );

    client
        .post_blocking("/notes", "plain text", Params::new())
        .unwrap();
    assert_eq!(
        transport.last().body,
        RequestBody::Scalar("plain text".to_string())
    );

    client
        .post_blocking("/none", json!(null), Params::new())
        .unwrap();
    assert_eq!(transport.last().body, RequestBody::Empty);
}

#[tokio::test]
async fn async_and_blocking_forms_build_the_same_request() {
    let transport = CapturingTransport::new();
    let client = HelpdeskClient::builder()
        .helpdesk_url("http://deskpro-dev.com")
        .auth_token(1, "secret")
        .transport(transport.clone())
        .build()
        .unwrap();

    client
        .get("/articles/{id}", Params::new().insert("id", 4))
        .await
        .unwrap();
    let from_async = transport.last();

    // The blocking form goes through the same preparation path; only the
    // dispatch differs. Compare the built requests field by field.
    client
        .get_blocking("/articles/{id}", Params::new().insert("id", 4))
        .unwrap();
    let from_blocking = transport.last();

    assert_eq!(from_async.url, from_blocking.url);
    assert_eq!(from_async.method, from_blocking.method);
    assert_eq!(
        from_async.headers.get("authorization"),
        from_blocking.headers.get("authorization")
    );
}

#[test]
fn the_outgoing_request_is_logged_at_debug() {
    let transport = CapturingTransport::new();
    let sink = Arc::new(RecordingLogSink {
        entries: Mutex::new(Vec::new()),
    });
    let client = HelpdeskClient::builder()
        .helpdesk_url("http://deskpro-dev.com")
        .log_sink(sink.clone())
        .transport(transport)
        .build()
        .unwrap();

    client
        .post_blocking("/articles", json!({"title": "T"}), Params::new())
        .unwrap();

    let entries = sink.entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    let (level, message, context) = &entries[0];
    assert_eq!(*level, LogLevel::Debug);
    assert!(message.contains("POST http://deskpro-dev.com/api/v2/articles"));
    assert_eq!(context["body"], json!({"title": "T"}));
    assert!(context["headers"].is_object());
}
