//! Request executor: throttle gate, transport call, classification

use super::transport::{Transport, TransportRequest};
use crate::config::TelemetryVerbosity;
use crate::error::Result;
use crate::pagination::PageLinks;
use crate::response::{ResponseEnvelope, ResponseProcessor};
use crate::telemetry::{CallRecord, TelemetrySink, TracingSink};
use crate::throttle::{QuotaReport, ThrottleController};
use crate::types::{ApiFamily, JsonValue, ThrottleTier, Verb};
use std::sync::Arc;
use tracing::{debug, warn};

/// One call to execute
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// HTTP verb
    pub verb: Verb,
    /// Fully built URL
    pub url: String,
    /// Request body, already wrapped if needed
    pub body: Option<JsonValue>,
    /// Key to unwrap from the response body
    pub data_key: Option<String>,
    /// Throttle tier of the caller
    pub tier: ThrottleTier,
}

impl Call {
    /// Create a call without body or data key
    pub fn new(verb: Verb, url: impl Into<String>) -> Self {
        Self {
            verb,
            url: url.into(),
            body: None,
            data_key: None,
            tier: ThrottleTier::Normal,
        }
    }

    /// Attach a request body
    #[must_use]
    pub fn body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Unwrap this key from the response
    #[must_use]
    pub fn data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = Some(key.into());
        self
    }

    /// Set the caller's throttle tier
    #[must_use]
    pub fn tier(mut self, tier: ThrottleTier) -> Self {
        self.tier = tier;
        self
    }
}

/// Runs calls through throttle, transport and response processor
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    throttle: ThrottleController,
    processor: ResponseProcessor,
    telemetry: Arc<dyn TelemetrySink>,
    verbosity: TelemetryVerbosity,
    family: ApiFamily,
}

impl RequestExecutor {
    /// Create an executor for the REST family with tracing telemetry
    pub fn new(
        transport: Arc<dyn Transport>,
        throttle: ThrottleController,
        processor: ResponseProcessor,
    ) -> Self {
        Self {
            transport,
            throttle,
            processor,
            telemetry: Arc::new(TracingSink),
            verbosity: TelemetryVerbosity::default(),
            family: ApiFamily::Rest,
        }
    }

    /// Replace the telemetry sink and payload verbosity
    #[must_use]
    pub fn with_telemetry(
        mut self,
        sink: Arc<dyn TelemetrySink>,
        verbosity: TelemetryVerbosity,
    ) -> Self {
        self.telemetry = sink;
        self.verbosity = verbosity;
        self
    }

    /// Throttle controller in use
    pub fn throttle(&self) -> &ThrottleController {
        &self.throttle
    }

    /// API family whose quota this executor tracks
    pub fn family(&self) -> ApiFamily {
        self.family
    }

    /// Execute one call.
    ///
    /// Throttle store failures are logged and never fail the call; the
    /// throttle is voluntary pacing only. `links` is updated from the
    /// response headers.
    pub async fn execute(&self, call: Call, links: &mut PageLinks) -> Result<JsonValue> {
        if let Err(e) = self.throttle.gate(self.family, call.tier).await {
            warn!(error = %e, "Throttle gate unavailable, sending call without delay");
        }

        let request = TransportRequest::new(call.verb, &call.url, call.body.clone());
        let envelope = match self.transport.execute(request).await {
            Ok(envelope) => envelope,
            Err(e) => {
                self.record(&call, &ResponseEnvelope::default(), Some(e.to_string()));
                return Err(e);
            }
        };

        let quota = QuotaReport::from_response(self.family, &envelope);
        if let Err(e) = self.throttle.update(self.family, quota).await {
            warn!(error = %e, "Failed to update throttle flags");
        }

        let result = self
            .processor
            .process(&envelope, call.data_key.as_deref(), links);
        self.record(
            &call,
            &envelope,
            result.as_ref().err().map(ToString::to_string),
        );

        debug!(verb = %call.verb, url = %call.url, ok = result.is_ok(), "Call finished");
        result
    }

    fn record(&self, call: &Call, envelope: &ResponseEnvelope, error_text: Option<String>) {
        let record = CallRecord::from_call(
            self.family,
            call.verb,
            &call.url,
            call.body.as_ref(),
            envelope,
            error_text,
            self.verbosity,
        );
        self.telemetry.record(&record);
    }
}
