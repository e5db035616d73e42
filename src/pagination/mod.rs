//! Pagination module
//!
//! Cursor pagination driven by the `link` response header.
//!
//! # Overview
//!
//! Every processed response overwrites the node's [`PageLinks`] with the
//! `next` / `previous` URLs found in its `link` header. Callers fetch the
//! adjacent page by passing the query parameters of one of those links back
//! into the same verb.
//!
//! Responses tagged with an API version older than
//! [`MIN_LINK_API_VERSION`] predate cursor links and never yield any.

mod links;

pub use links::{
    links_supported, parse_link_header, query_params, PageLinks, API_VERSION_HEADER,
    MIN_LINK_API_VERSION,
};
