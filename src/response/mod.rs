//! Response module
//!
//! Interprets one transport response: absent bodies, error envelopes,
//! benign error mappings, pagination links and data-key unwrapping.
//!
//! # Overview
//!
//! - `ResponseEnvelope` - status, lower-cased headers and decoded body of one call
//! - `ResponseProcessor` - classifies an envelope into a payload or a typed failure
//! - `flatten_errors` - renders an `errors` field as a readable message

mod processor;

pub use processor::{flatten_errors, ResponseEnvelope, ResponseProcessor, ACCEPTED_EMPTY_STATUSES};
