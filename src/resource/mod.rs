//! Resource module
//!
//! The navigable tree of remote resources.
//!
//! # Overview
//!
//! - `ResourceKind` - static description of one resource type
//! - `ResourceCatalog` - validated set of kinds, loaded from YAML
//! - `ResourceNode` - one addressable node; dispatches names to children or
//!   custom actions and issues the standard verbs
//!
//! # Example
//!
//! ```ignore
//! let root = client.root()?;
//! let mut images = root
//!     .child("Product", Some(632910392.into()))?
//!     .child("Image", None)?;
//! let all = images.get(&QueryParams::new()).await?;
//! let closed = root.child("Order", Some(450789469.into()))?.action("close", None).await?;
//! ```

mod catalog;
mod kind;
mod node;

pub use catalog::{ResourceCatalog, BUILTIN_CATALOG};
pub use kind::{ActionEntry, ActionRegistry, ChildEntry, ResourceKind};
pub use node::{Navigation, ResourceNode, Target};
