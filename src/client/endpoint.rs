//! Endpoint resolution: `{placeholder}` interpolation and query strings.
//!
//! Query-string convention for non-scalar values is bracket notation,
//! recursing into nested structures: `ids[0]=1&ids[1]=2` for arrays and
//! `filter[status]=open` for maps. Keys and values are percent-encoded.
//! Null-valued parameters are skipped.

use crate::types::Params;
use serde_json::Value;
use url::form_urlencoded;

/// Resolve `{placeholder}` tokens in `template` against `params`, then
/// append whatever was not consumed as a query string.
///
/// A parameter consumes its placeholder only when its value is a scalar;
/// every occurrence of the exact `{key}` token is replaced. Placeholders
/// with no matching parameter are left verbatim. Leftover parameters keep
/// their insertion order in the query string.
pub fn interpolate(template: &str, params: Params) -> String {
    let mut url = template.to_string();
    let mut leftover: Vec<(String, Value)> = Vec::new();

    for (key, value) in params {
        if let Some(scalar) = scalar_string(&value) {
            let token = format!("{{{}}}", key);
            if url.contains(&token) {
                url = url.replace(&token, &scalar);
                continue;
            }
        }
        leftover.push((key, value));
    }

    if !leftover.is_empty() {
        url.push('?');
        url.push_str(&encode_query(&leftover));
    }

    url
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn encode_query(entries: &[(String, Value)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in entries {
        append_pairs(&mut serializer, key, value);
    }
    serializer.finish()
}

fn append_pairs(serializer: &mut form_urlencoded::Serializer<'_, String>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                append_pairs(serializer, &format!("{}[{}]", key, index), item);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                append_pairs(serializer, &format!("{}[{}]", key, sub), item);
            }
        }
        scalar => {
            // Null and containers are handled above, this cannot miss.
            if let Some(s) = scalar_string(scalar) {
                serializer.append_pair(key, &s);
            }
        }
    }
}
