//! Per-call telemetry
//!
//! Every executed call produces a [`CallRecord`], whether or not it failed.
//! Records are handed to a [`TelemetrySink`]; the default sink emits one
//! structured `tracing` event per call. Persistent audit storage is left to
//! callers implementing their own sink.

use crate::config::TelemetryVerbosity;
use crate::response::ResponseEnvelope;
use crate::throttle::{retry_after, QuotaReport};
use crate::types::{ApiFamily, Headers, JsonValue, Verb};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Everything a logging collaborator needs about one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub api_family: ApiFamily,
    pub verb: Verb,
    pub url: String,
    pub status: Option<u16>,
    pub quota_available: Option<f64>,
    pub quota_maximum: Option<f64>,
    pub retry_after: Option<f64>,
    pub error_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_payload: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_payload: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<Headers>,
}

impl CallRecord {
    /// Build a record from a finished call
    pub fn from_call(
        api_family: ApiFamily,
        verb: Verb,
        url: &str,
        request_payload: Option<&JsonValue>,
        envelope: &ResponseEnvelope,
        error_text: Option<String>,
        verbosity: TelemetryVerbosity,
    ) -> Self {
        let quota = QuotaReport::from_response(api_family, envelope);
        Self {
            api_family,
            verb,
            url: url.to_string(),
            status: envelope.status,
            quota_available: quota.map(|q| q.available),
            quota_maximum: quota.map(|q| q.maximum),
            retry_after: retry_after(&envelope.headers),
            error_text,
            request_payload: request_payload
                .filter(|_| verbosity.includes_payloads())
                .cloned(),
            response_payload: envelope
                .body
                .as_ref()
                .filter(|_| verbosity.includes_payloads())
                .cloned(),
            response_headers: verbosity
                .includes_headers()
                .then(|| envelope.headers.clone()),
        }
    }
}

/// Receiver of call records
pub trait TelemetrySink: Send + Sync + fmt::Debug {
    /// Record one finished call
    fn record(&self, record: &CallRecord);
}

/// Emits each record as a structured `tracing` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&self, record: &CallRecord) {
        info!(
            api_family = %record.api_family,
            verb = %record.verb,
            url = %record.url,
            status = ?record.status,
            quota_available = ?record.quota_available,
            quota_maximum = ?record.quota_maximum,
            retry_after = ?record.retry_after,
            error = record.error_text.as_deref().unwrap_or(""),
            "API call"
        );
    }
}

/// Keeps records in memory, mostly for tests and diagnostics
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<CallRecord>>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Records captured so far
    pub fn records(&self) -> Vec<CallRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl TelemetrySink for MemorySink {
    fn record(&self, record: &CallRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}
