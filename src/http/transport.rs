//! Transport seam and its reqwest implementation

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::response::ResponseEnvelope;
use crate::types::{Headers, JsonValue, Verb};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// One outgoing request
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP verb
    pub verb: Verb,
    /// Absolute URL including query string
    pub url: String,
    /// Extra request headers
    pub headers: Headers,
    /// JSON body for writes
    pub body: Option<JsonValue>,
}

impl TransportRequest {
    /// Create a request without headers
    pub fn new(verb: Verb, url: impl Into<String>, body: Option<JsonValue>) -> Self {
        Self {
            verb,
            url: url.into(),
            headers: Headers::new(),
            body,
        }
    }
}

/// Executes requests against the remote API.
///
/// Implementations must surface the response status and headers even when
/// the body cannot be decoded, reporting the body as `None`.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Execute one request
    async fn execute(&self, request: TransportRequest) -> Result<ResponseEnvelope>;
}

/// `reqwest`-backed transport sending the access token on every request
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport from client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.access_token {
            let name = HeaderName::from_bytes(config.token_header.as_bytes()).map_err(|e| {
                Error::invalid_value("token_header", format!("not a valid header name: {e}"))
            })?;
            let mut value = HeaderValue::from_str(token).map_err(|e| {
                Error::invalid_value("access_token", format!("not a valid header value: {e}"))
            })?;
            value.set_sensitive(true);
            default_headers.insert(name, value);
        }

        // 303 responses are handed to the response processor, not followed
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(format!("resttree/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers)
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<ResponseEnvelope> {
        let mut req = self.client.request(request.verb.into(), &request.url);

        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if let Some(ref body) = request.body {
            req = req.json(body);
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let headers = lowercase_headers(response.headers());
        let text = response.text().await?;

        let body = if text.trim().is_empty() {
            None
        } else {
            match serde_json::from_str::<JsonValue>(&text) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!(status, error = %e, "Response body is not JSON");
                    None
                }
            }
        };

        debug!("{} {} -> {}", request.verb, request.url, status);
        Ok(ResponseEnvelope::new(Some(status), headers, body))
    }
}

/// Collect headers under lower-cased names; repeated headers are comma-joined
fn lowercase_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in map {
        let Ok(value) = value.to_str() else {
            continue;
        };
        headers
            .entry(name.as_str().to_ascii_lowercase())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    headers
}
