//! Throttle module
//!
//! Voluntary request pacing against a remote, server-reported quota.
//!
//! # Overview
//!
//! After every response the controller turns the reported quota
//! (`available / maximum`) into two "should delay" flags, one per tier, and
//! writes them to a shared [`ThrottleStore`] with a 60 second freshness
//! window. Before every call the flag of the caller's tier is read back and,
//! when set, the call sleeps for the tier's configured delay.
//!
//! The read (gate) and the write (update) are separate store operations.
//! Concurrent callers sharing a tenant may interleave them, so the governor
//! is probabilistic rather than a hard rate guarantee.

mod controller;
mod quota;
mod store;

pub use controller::{ThrottleController, ThrottleFlags, FLAG_TTL};
pub use quota::{retry_after, QuotaReport, REST_CALL_LIMIT_HEADER, RETRY_AFTER_HEADER};
pub use store::{FileStore, InMemoryStore, ThrottleStore};

#[cfg(test)]
mod tests;
