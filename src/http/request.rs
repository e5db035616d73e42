//! URL and payload construction

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, QueryParams};

/// Build a request URL: `base [/ action] .json [? query]`.
///
/// Query keys are emitted in sorted order, so a given mapping always
/// produces the same URL.
pub fn build_url(base_url: &str, custom_action: Option<&str>, params: &QueryParams) -> String {
    let mut url = base_url.trim_end_matches('/').to_string();
    if let Some(action) = custom_action.filter(|a| !a.is_empty()) {
        url.push('/');
        url.push_str(action.trim_matches('/'));
    }
    url.push_str(".json");

    if !params.is_empty() {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        url.push('?');
        url.push_str(&query);
    }
    url
}

/// Flatten a JSON mapping into query parameters.
///
/// Scalars are rendered as text, lists are comma-joined and nested mappings
/// use bracket keys (`created_at[min]`). Null values are dropped.
pub fn query_from_json(value: &JsonValue) -> Result<QueryParams> {
    let mut params = QueryParams::new();
    match value {
        JsonValue::Null => {}
        JsonValue::Object(map) => flatten_into(&mut params, None, map),
        other => {
            return Err(Error::Other(format!(
                "Query parameters must be a mapping, got {other}"
            )))
        }
    }
    Ok(params)
}

fn flatten_into(params: &mut QueryParams, prefix: Option<&str>, map: &JsonObject) {
    for (key, value) in map {
        let key = match prefix {
            Some(prefix) => format!("{prefix}[{key}]"),
            None => key.clone(),
        };
        match value {
            JsonValue::Null => {}
            JsonValue::Object(nested) => flatten_into(params, Some(&key), nested),
            JsonValue::Array(items) => {
                let joined = items
                    .iter()
                    .filter_map(scalar_text)
                    .collect::<Vec<_>>()
                    .join(",");
                params.insert(key, joined);
            }
            scalar => {
                if let Some(text) = scalar_text(scalar) {
                    params.insert(key, text);
                }
            }
        }
    }
}

fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Wrap a payload as `{key: payload}` unless it is empty
pub fn wrap_payload(key: &str, payload: JsonValue) -> JsonValue {
    if is_empty_payload(&payload) {
        return payload;
    }
    let mut envelope = JsonObject::new();
    envelope.insert(key.to_string(), payload);
    JsonValue::Object(envelope)
}

pub(crate) fn is_empty_payload(payload: &JsonValue) -> bool {
    match payload {
        JsonValue::Null => true,
        JsonValue::Object(map) => map.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::String(s) => s.is_empty(),
        _ => false,
    }
}
