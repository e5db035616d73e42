//! Link header parsing

use crate::types::{Headers, QueryParams};
use regex::Regex;
use std::sync::LazyLock;

/// Response header carrying the API version that served the request
pub const API_VERSION_HEADER: &str = "x-shopify-api-version";

/// Oldest API version whose responses carry cursor links
pub const MIN_LINK_API_VERSION: &str = "2019-07";

/// Response header carrying pagination links
const LINK_HEADER: &str = "link";

static LINK_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<(.*?)>;\s*rel="([a-z]+)""#).expect("link segment pattern is valid")
});

/// Next / previous page URLs of the last processed response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// URL of the next page
    pub next: Option<String>,
    /// URL of the previous page
    pub previous: Option<String>,
}

impl PageLinks {
    /// Extract links from response headers.
    ///
    /// Yields no links when the response's API version predates cursor
    /// pagination or no `link` header is present.
    pub fn from_headers(headers: &Headers) -> Self {
        if !links_supported(headers) {
            return Self::default();
        }

        match headers.get(LINK_HEADER).filter(|v| !v.trim().is_empty()) {
            Some(value) => Self {
                next: parse_link_header(value, "next"),
                previous: parse_link_header(value, "previous"),
            },
            None => Self::default(),
        }
    }

    /// Whether a next page exists
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Whether a previous page exists
    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Query parameters of the next page link (empty if there is none)
    pub fn next_page_params(&self) -> QueryParams {
        self.next.as_deref().map(query_params).unwrap_or_default()
    }

    /// Query parameters of the previous page link (empty if there is none)
    pub fn prev_page_params(&self) -> QueryParams {
        self.previous.as_deref().map(query_params).unwrap_or_default()
    }
}

/// Whether the response format can carry cursor links at all.
///
/// Version strings are date-formatted (`YYYY-MM`) and compared
/// lexicographically; a missing version header counts as supported.
pub fn links_supported(headers: &Headers) -> bool {
    headers
        .get(API_VERSION_HEADER)
        .is_none_or(|version| version.trim() >= MIN_LINK_API_VERSION)
}

/// Find the URL of the link segment with the given `rel` value.
///
/// Format: `<https://host/items.json?page_info=abc>; rel="next", <...>; rel="previous"`
pub fn parse_link_header(header: &str, rel: &str) -> Option<String> {
    header.split(',').find_map(|segment| {
        let captures = LINK_SEGMENT.captures(segment)?;
        if captures[2].eq_ignore_ascii_case(rel) {
            Some(captures[1].trim().to_string())
        } else {
            None
        }
    })
}

/// Decode the query string of a URL into a parameter mapping
pub fn query_params(url: &str) -> QueryParams {
    let without_fragment = url.split('#').next().unwrap_or_default();
    match without_fragment.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect(),
        None => QueryParams::new(),
    }
}
