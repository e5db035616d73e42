//! Recording transport for unit tests

use super::transport::{Transport, TransportRequest};
use crate::error::Result;
use crate::response::ResponseEnvelope;
use crate::types::{Headers, JsonValue};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays queued responses and records every request
#[derive(Debug, Clone, Default)]
pub(crate) struct MockTransport {
    responses: Arc<Mutex<VecDeque<ResponseEnvelope>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response
    pub(crate) fn respond(&self, status: u16, body: JsonValue) -> &Self {
        self.respond_with(ResponseEnvelope::new(Some(status), Headers::new(), Some(body)))
    }

    /// Queue a raw envelope
    pub(crate) fn respond_with(&self, envelope: ResponseEnvelope) -> &Self {
        self.responses.lock().unwrap().push_back(envelope);
        self
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> Option<TransportRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: TransportRequest) -> Result<ResponseEnvelope> {
        self.requests.lock().unwrap().push(request);
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                ResponseEnvelope::new(
                    Some(200),
                    Headers::new(),
                    Some(JsonValue::Object(Default::default())),
                )
            }))
    }
}
