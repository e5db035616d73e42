//! Response classification

use crate::config::BenignErrorRule;
use crate::error::{Error, Result};
use crate::pagination::PageLinks;
use crate::types::{Headers, JsonObject, JsonValue};
use tracing::{debug, warn};

/// Statuses accepted when no body could be decoded
pub const ACCEPTED_EMPTY_STATUSES: [u16; 3] = [200, 201, 204];

/// HTTP "See Other": success whose payload is the redirect target
const SEE_OTHER: u16 = 303;

/// Outcome of one transport call, consumed once by the processor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseEnvelope {
    /// Last HTTP status observed, if the transport saw one
    pub status: Option<u16>,
    /// Last response headers, names lower-cased
    pub headers: Headers,
    /// Decoded JSON body, `None` when nothing could be decoded
    pub body: Option<JsonValue>,
}

impl ResponseEnvelope {
    /// Create an envelope
    pub fn new(status: Option<u16>, headers: Headers, body: Option<JsonValue>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Classifies responses into payloads or typed failures
#[derive(Debug, Clone, Default)]
pub struct ResponseProcessor {
    benign_errors: Vec<BenignErrorRule>,
}

impl ResponseProcessor {
    /// Create a processor with the given benign error mappings
    pub fn new(benign_errors: Vec<BenignErrorRule>) -> Self {
        Self { benign_errors }
    }

    /// Classify one response.
    ///
    /// `links` is overwritten from the response headers on every path that
    /// reaches the body, including error envelopes.
    pub fn process(
        &self,
        envelope: &ResponseEnvelope,
        data_key: Option<&str>,
        links: &mut PageLinks,
    ) -> Result<JsonValue> {
        let body = match &envelope.body {
            Some(body) => body,
            None => {
                if let Some(result) = self.without_body(envelope)? {
                    return Ok(result);
                }
                *links = PageLinks::from_headers(&envelope.headers);
                return Ok(JsonValue::Object(JsonObject::new()));
            }
        };

        *links = PageLinks::from_headers(&envelope.headers);

        if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
            let message = flatten_errors(errors);
            if let Some(result) = self.benign_result(&message) {
                debug!(message = %message, "Error envelope mapped to benign result");
                return Ok(result.clone());
            }
            warn!(status = ?envelope.status, message = %message, "API returned errors");
            return Err(Error::api(message, envelope.status));
        }

        match data_key.and_then(|key| body.get(key)).filter(|v| !v.is_null()) {
            Some(inner) => Ok(inner.clone()),
            None => Ok(body.clone()),
        }
    }

    /// Handle a response whose body could not be decoded.
    ///
    /// Returns a finished result for redirect-style successes, `None` for an
    /// accepted empty response, or a transport error.
    fn without_body(&self, envelope: &ResponseEnvelope) -> Result<Option<JsonValue>> {
        match envelope.status {
            Some(SEE_OTHER) => match envelope.header("location") {
                Some(location) => {
                    let mut result = JsonObject::new();
                    result.insert(
                        "location".to_string(),
                        JsonValue::String(location.to_string()),
                    );
                    Ok(Some(JsonValue::Object(result)))
                }
                None => Err(Error::TransportError { status: SEE_OTHER }),
            },
            Some(status) if !ACCEPTED_EMPTY_STATUSES.contains(&status) => {
                warn!(status, "Request failed without a decodable body");
                Err(Error::TransportError { status })
            }
            _ => Ok(None),
        }
    }

    fn benign_result(&self, message: &str) -> Option<&JsonValue> {
        self.benign_errors
            .iter()
            .find(|rule| rule.message == message)
            .map(|rule| &rule.result)
    }
}

/// Render an `errors` value as one human-readable line.
///
/// Mappings become `key - value` pairs, lists are comma-joined and nested
/// values are flattened recursively.
pub fn flatten_errors(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Array(items) => items
            .iter()
            .map(flatten_errors)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        JsonValue::Object(map) => map
            .iter()
            .map(|(key, val)| format!("{key} - {}", flatten_errors(val)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
