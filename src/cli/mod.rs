//! CLI module
//!
//! Command-line interface for ad-hoc admin API calls.
//!
//! # Commands
//!
//! - `get` - GET a resource path, optionally following page links
//! - `count` - Count a collection
//! - `search` - Search a collection
//! - `action` - Invoke a custom action
//! - `resources` - List catalog resources, or describe one kind
//! - `throttle` - Show the current throttle flags of the tenant

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
