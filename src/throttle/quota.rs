//! Server-reported quota extraction

use crate::response::ResponseEnvelope;
use crate::types::{ApiFamily, Headers, JsonValue};

/// REST quota header, formatted `<used>/<maximum>`
pub const REST_CALL_LIMIT_HEADER: &str = "x-shopify-shop-api-call-limit";

/// Seconds the server asks callers to wait
pub const RETRY_AFTER_HEADER: &str = "retry-after";

/// Remaining and total calls reported by one response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotaReport {
    /// Calls still available
    pub available: f64,
    /// Size of the quota
    pub maximum: f64,
}

impl QuotaReport {
    /// Create a report; `None` unless `maximum` is positive
    pub fn new(available: f64, maximum: f64) -> Option<Self> {
        (maximum > 0.0 && available.is_finite()).then_some(Self {
            available,
            maximum,
        })
    }

    /// Share of the quota still available, in percent
    pub fn percent_available(&self) -> f64 {
        self.available / self.maximum * 100.0
    }

    /// Extract the quota reported for an API family
    pub fn from_response(family: ApiFamily, envelope: &ResponseEnvelope) -> Option<Self> {
        match family {
            ApiFamily::Rest => Self::from_rest_headers(&envelope.headers),
            ApiFamily::Graphql => envelope.body.as_ref().and_then(Self::from_graphql_body),
        }
    }

    /// Parse the REST call-limit header (`32/40` means 8 calls left)
    pub fn from_rest_headers(headers: &Headers) -> Option<Self> {
        let (used, maximum) = headers.get(REST_CALL_LIMIT_HEADER)?.split_once('/')?;
        let used: f64 = used.trim().parse().ok()?;
        let maximum: f64 = maximum.trim().parse().ok()?;
        Self::new(maximum - used, maximum)
    }

    /// Parse `extensions.cost.throttleStatus` from a GraphQL body
    pub fn from_graphql_body(body: &JsonValue) -> Option<Self> {
        let status = body.pointer("/extensions/cost/throttleStatus")?;
        Self::new(
            status.get("currentlyAvailable")?.as_f64()?,
            status.get("maximumAvailable")?.as_f64()?,
        )
    }
}

/// Parse the `retry-after` header as seconds
pub fn retry_after(headers: &Headers) -> Option<f64> {
    headers
        .get(RETRY_AFTER_HEADER)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| *secs >= 0.0)
}
