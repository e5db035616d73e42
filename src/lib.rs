// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # resttree
//!
//! A navigable, throttled client core for a hierarchical admin REST API.
//!
//! ## Features
//!
//! - **Resource Tree**: Capitalized names navigate to child resources, other
//!   names invoke custom actions, all driven by a YAML resource catalog
//! - **Standard Verbs**: get, count, search, post, put, delete with envelope
//!   wrapping and data-key unwrapping
//! - **Cursor Pagination**: next/previous links parsed from `Link` headers
//! - **Voluntary Throttling**: server-reported quota turned into per-tier
//!   delay flags shared through a pluggable store
//! - **Telemetry**: one structured record per call
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use resttree::{Client, ClientConfig, QueryParams, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut config = ClientConfig::new("my-store.myshopify.com");
//!     config.access_token = Some("shpat_...".to_string());
//!     let client = Client::from_config(config)?;
//!
//!     let mut images = client.path("Product:632910392/Image")?;
//!     let all = images.get(&QueryParams::new()).await?;
//!     let total = images.count(&QueryParams::new()).await?;
//!
//!     let mut order = client.resource("Order", Some(450789469.into()))?;
//!     order.action("close", None).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   ResourceNode (dispatch)                    │
//! │  Child -> new node    action -> verb + segment    get/post/..│
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────┬──────────────┴┬───────────────┬───────────────┐
//! │   Throttle   │   Transport   │   Response    │   Telemetry   │
//! ├──────────────┼───────────────┼───────────────┼───────────────┤
//! │ gate/update  │ reqwest       │ errors/benign │ CallRecord    │
//! │ memory/file  │ token header  │ links/unwrap  │ tracing sink  │
//! └──────────────┴───────────────┴───────────────┴───────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// Link header pagination
pub mod pagination;

/// Response classification
pub mod response;

/// Quota-driven request pacing
pub mod throttle;

/// Transport and request execution
pub mod http;

/// Per-call telemetry records
pub mod telemetry;

/// Resource kinds, catalogs and nodes
pub mod resource;

/// Client entry point
pub mod client;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use client::Client;
pub use config::ClientConfig;
pub use resource::{Navigation, ResourceCatalog, ResourceNode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
