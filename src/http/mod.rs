//! HTTP module
//!
//! Request construction and execution against the remote API.
//!
//! # Features
//!
//! - **Transport seam**: [`Transport`] trait with a `reqwest` implementation
//! - **Deterministic URLs**: `base[/action].json[?query]` with sorted query keys
//! - **Payload envelopes**: `{key: payload}` wrapping for writes
//! - **Throttling**: every call passes the throttle gate first and feeds the
//!   reported quota back afterwards
//! - **Telemetry**: one [`CallRecord`](crate::telemetry::CallRecord) per call

mod executor;
mod request;
mod transport;

pub use executor::{Call, RequestExecutor};
pub use request::{build_url, query_from_json, wrap_payload};
pub use transport::{ReqwestTransport, Transport, TransportRequest};

#[cfg(test)]
pub(crate) mod mock;
