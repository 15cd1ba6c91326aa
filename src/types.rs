//! Request and response data types shared by the client and transport layers.

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered per-call parameter map.
///
/// Entries keep insertion order; that order drives the query-string output
/// once path placeholders have consumed their entries. Values are JSON
/// values so nested structures can pass through to the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, Value)>);

impl Params {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a parameter, keeping insertion order.
    pub fn insert(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.0.iter()
    }
}

impl IntoIterator for Params {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One part of a multipart form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub contents: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl FormPart {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
            filename: None,
            content_type: None,
        }
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Outgoing request body, classified once at call time.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// Sent verbatim, no implicit Content-Type.
    Scalar(String),
    /// JSON-encoded by the transport.
    Json(Value),
    /// Rendered as a multipart form by the transport.
    Multipart(Vec<FormPart>),
}

impl From<Value> for RequestBody {
    /// Classifies a dynamic body value: null stays empty, scalars are sent
    /// as-is, an object carrying a `multipart` entry becomes a multipart
    /// form, and everything else is JSON-encoded.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RequestBody::Empty,
            Value::String(s) => RequestBody::Scalar(s),
            Value::Number(n) => RequestBody::Scalar(n.to_string()),
            Value::Bool(b) => RequestBody::Scalar(b.to_string()),
            Value::Object(map) if map.contains_key("multipart") => {
                let parts = map
                    .get("multipart")
                    .and_then(Value::as_array)
                    .map(|entries| parts_from_entries(entries))
                    .unwrap_or_default();
                RequestBody::Multipart(parts)
            }
            other => RequestBody::Json(other),
        }
    }
}

impl From<&str> for RequestBody {
    fn from(value: &str) -> Self {
        RequestBody::Scalar(value.to_string())
    }
}

/// Reads `{name, contents, filename?, content_type?}` part descriptions.
/// Entries missing `name` or `contents` are dropped.
fn parts_from_entries(entries: &[Value]) -> Vec<FormPart> {
    entries
        .iter()
        .filter_map(|entry| {
            let map = entry.as_object()?;
            let name = map.get("name")?.as_str()?;
            let contents = map.get("contents")?.as_str()?;
            let mut part = FormPart::new(name, contents.as_bytes().to_vec());
            if let Some(filename) = map.get("filename").and_then(Value::as_str) {
                part = part.filename(filename);
            }
            if let Some(content_type) = map.get("content_type").and_then(Value::as_str) {
                part = part.content_type(content_type);
            }
            Some(part)
        })
        .collect()
}

/// A fully built request, ready for the transport.
///
/// Constructed fresh per call and never reused; the diagnostic snapshot
/// keeps a clone of the last one.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

/// The structured `{data, meta, linked}` response envelope.
///
/// All three fields are always present once an envelope is constructed,
/// possibly as empty containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Primary payload; shape depends on the endpoint.
    pub data: Value,
    /// Pagination and count metadata.
    pub meta: Value,
    /// Side-loaded related entities keyed by type.
    pub linked: Value,
}

/// Decoded body of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The structured API envelope.
    Envelope(ApiResponse),
    /// Valid JSON that does not carry the full envelope.
    Json(Value),
    /// Anything the decoder could not treat as JSON, returned unchanged.
    Raw(Bytes),
}

impl ResponseBody {
    pub fn envelope(&self) -> Option<&ApiResponse> {
        match self {
            ResponseBody::Envelope(envelope) => Some(envelope),
            _ => None,
        }
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn raw(&self) -> Option<&Bytes> {
        match self {
            ResponseBody::Raw(body) => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_body_is_empty() {
        assert_eq!(RequestBody::from(json!(null)), RequestBody::Empty);
    }

    #[test]
    fn scalar_bodies_pass_through() {
        assert_eq!(
            RequestBody::from(json!("plain text")),
            RequestBody::Scalar("plain text".to_string())
        );
        assert_eq!(RequestBody::from(json!(42)), RequestBody::Scalar("42".to_string()));
        assert_eq!(RequestBody::from(json!(true)), RequestBody::Scalar("true".to_string()));
    }

    #[test]
    fn structures_become_json() {
        let body = RequestBody::from(json!({"title": "Welcome", "content": "Hello"}));
        assert_eq!(body, RequestBody::Json(json!({"title": "Welcome", "content": "Hello"})));

        let body = RequestBody::from(json!([1, 2, 3]));
        assert_eq!(body, RequestBody::Json(json!([1, 2, 3])));
    }

    #[test]
    fn multipart_marker_builds_parts() {
        let body = RequestBody::from(json!({
            "multipart": [
                {"name": "file", "contents": "binary here", "filename": "a.txt", "content_type": "text/plain"},
                {"name": "note", "contents": "attached"}
            ]
        }));

        let RequestBody::Multipart(parts) = body else {
            panic!("expected multipart body");
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "file");
        assert_eq!(parts[0].filename.as_deref(), Some("a.txt"));
        assert_eq!(parts[0].content_type.as_deref(), Some("text/plain"));
        assert_eq!(parts[1].contents, b"attached".to_vec());
    }

    #[test]
    fn malformed_multipart_entries_are_dropped() {
        let body = RequestBody::from(json!({
            "multipart": [{"name": "file"}, {"contents": "x"}, "not an object"]
        }));
        assert_eq!(body, RequestBody::Multipart(Vec::new()));
    }

    #[test]
    fn params_keep_insertion_order() {
        let params = Params::new()
            .insert("z", 1)
            .insert("a", 2)
            .insert("m", 3);
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }
}
