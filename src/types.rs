//! Common types used throughout resttree
//!
//! This module contains shared type definitions, type aliases,
//! and small value types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Ordered query parameter map.
///
/// Ordered so that encoding a given mapping always yields the same query string.
pub type QueryParams = BTreeMap<String, String>;

/// Response headers with lower-cased names
pub type Headers = BTreeMap<String, String>;

// ============================================================================
// HTTP Verbs
// ============================================================================

/// HTTP verb used by the request executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
}

impl Verb {
    /// Order in which custom action registries are scanned
    pub const ACTION_SCAN_ORDER: [Verb; 4] = [Verb::POST, Verb::PUT, Verb::GET, Verb::DELETE];

    /// Whether the verb writes to the remote resource
    pub fn is_write(self) -> bool {
        !matches!(self, Verb::GET)
    }

    /// Whether an action argument is sent as the request body
    pub fn takes_body(self) -> bool {
        matches!(self, Verb::POST | Verb::PUT)
    }

    /// Upper-case verb name
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::GET => "GET",
            Verb::POST => "POST",
            Verb::PUT => "PUT",
            Verb::DELETE => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Verb> for reqwest::Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::GET => reqwest::Method::GET,
            Verb::POST => reqwest::Method::POST,
            Verb::PUT => reqwest::Method::PUT,
            Verb::DELETE => reqwest::Method::DELETE,
        }
    }
}

// ============================================================================
// API Family
// ============================================================================

/// API family sharing one remote quota
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFamily {
    #[default]
    Rest,
    Graphql,
}

impl ApiFamily {
    /// Lower-case family name used in store keys
    pub fn as_str(self) -> &'static str {
        match self {
            ApiFamily::Rest => "rest",
            ApiFamily::Graphql => "graphql",
        }
    }
}

impl fmt::Display for ApiFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Throttle Tier
// ============================================================================

/// Throttle class a caller draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThrottleTier {
    #[default]
    Normal,
    Priority,
}

impl ThrottleTier {
    /// Lower-case tier name
    pub fn as_str(self) -> &'static str {
        match self {
            ThrottleTier::Normal => "normal",
            ThrottleTier::Priority => "priority",
        }
    }
}

impl fmt::Display for ThrottleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Resource Identifier
// ============================================================================

/// Identifier of one concrete item in a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(u64),
    Text(String),
}

impl ResourceId {
    /// Build an identifier from a JSON scalar.
    ///
    /// Returns `None` for null, empty strings and non-scalar values.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Number(n) => n
                .as_u64()
                .map(ResourceId::Number)
                .or_else(|| Some(ResourceId::Text(n.to_string()))),
            JsonValue::String(s) if !s.is_empty() => Some(ResourceId::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Number(n) => write!(f, "{n}"),
            ResourceId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        ResourceId::Number(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        id.parse::<u64>()
            .map_or_else(|_| ResourceId::Text(id.to_string()), ResourceId::Number)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId::from(id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verb_classification() {
        assert!(!Verb::GET.is_write());
        assert!(Verb::POST.is_write());
        assert!(Verb::DELETE.is_write());
        assert!(Verb::PUT.takes_body());
        assert!(!Verb::DELETE.takes_body());
        assert_eq!(Verb::POST.to_string(), "POST");
    }

    #[test]
    fn test_action_scan_order() {
        assert_eq!(
            Verb::ACTION_SCAN_ORDER,
            [Verb::POST, Verb::PUT, Verb::GET, Verb::DELETE]
        );
    }

    #[test]
    fn test_resource_id_from_json() {
        assert_eq!(
            ResourceId::from_json(&json!(632_910_392)),
            Some(ResourceId::Number(632_910_392))
        );
        assert_eq!(
            ResourceId::from_json(&json!("gid-1")),
            Some(ResourceId::Text("gid-1".to_string()))
        );
        assert_eq!(ResourceId::from_json(&json!("")), None);
        assert_eq!(ResourceId::from_json(&json!(null)), None);
        assert_eq!(ResourceId::from_json(&json!({"id": 1})), None);
    }

    #[test]
    fn test_resource_id_from_str() {
        assert_eq!(ResourceId::from("42"), ResourceId::Number(42));
        assert_eq!(ResourceId::from("abc"), ResourceId::Text("abc".to_string()));
        assert_eq!(ResourceId::from("42").to_string(), "42");
    }

    #[test]
    fn test_enum_names() {
        assert_eq!(ApiFamily::Graphql.as_str(), "graphql");
        assert_eq!(ThrottleTier::Priority.to_string(), "priority");
        assert_eq!(ThrottleTier::default(), ThrottleTier::Normal);
    }
}
