//! Client configuration
//!
//! This module contains the configuration structures consumed by the client
//! core: tenant identity, credentials, throttle thresholds and delays,
//! telemetry verbosity and benign error mappings. Configuration is read-only
//! once a client has been built from it.

use crate::error::{Error, Result};
use crate::types::{JsonValue, ThrottleTier};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

/// Default delay for the normal tier when the configured value is unusable
pub const DEFAULT_NORMAL_DELAY_MS: u64 = 500;

/// Default delay for the priority tier when the configured value is unusable
pub const DEFAULT_PRIORITY_DELAY_MS: u64 = 250;

static API_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}|unstable)$").expect("API version pattern is valid")
});

// ============================================================================
// Top-Level Client Config
// ============================================================================

/// Complete client configuration loaded from YAML or JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Tenant identity, e.g. `my-store.myshopify.com`
    pub tenant: String,

    /// API version segment used in URLs, e.g. `2024-01`
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Access token sent with every request
    #[serde(default)]
    pub access_token: Option<String>,

    /// Header carrying the access token
    #[serde(default = "default_token_header")]
    pub token_header: String,

    /// Override for the admin base URL (tests, proxies)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Throttle settings
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Telemetry settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Error messages that are turned into regular results
    #[serde(default = "default_benign_errors")]
    pub benign_errors: Vec<BenignErrorRule>,

    /// Resource catalog file replacing the built-in catalog
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

fn default_api_version() -> String {
    "2024-01".to_string()
}

fn default_token_header() -> String {
    "X-Shopify-Access-Token".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_benign_errors() -> Vec<BenignErrorRule> {
    vec![BenignErrorRule::new(
        "account already enabled",
        json!({ "account_activation_url": false }),
    )]
}

impl ClientConfig {
    /// Create a config for a tenant with every other setting at its default
    pub fn new(tenant: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            api_version: default_api_version(),
            access_token: None,
            token_header: default_token_header(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
            throttle: ThrottleConfig::default(),
            telemetry: TelemetryConfig::default(),
            benign_errors: default_benign_errors(),
            catalog_path: None,
        }
    }

    /// Load a config file, choosing the format from its extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Parse and validate a YAML config
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> Result<()> {
        if self.tenant.trim().is_empty() {
            return Err(Error::invalid_value("tenant", "must not be empty"));
        }
        if !API_VERSION.is_match(&self.api_version) {
            return Err(Error::invalid_value(
                "api_version",
                format!("'{}' is not YYYY-MM or 'unstable'", self.api_version),
            ));
        }
        for (field, value) in [
            ("throttle.normal_threshold", self.throttle.normal_threshold),
            (
                "throttle.priority_threshold",
                self.throttle.priority_threshold,
            ),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(Error::invalid_value(
                    field,
                    format!("{value} is outside 0..=100"),
                ));
            }
        }
        Ok(())
    }

    /// Admin REST base URL, without trailing slash
    pub fn admin_url(&self) -> String {
        match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}/admin/api/{}",
                self.tenant.trim_end_matches('/'),
                self.api_version
            ),
        }
    }
}

// ============================================================================
// Throttle Config
// ============================================================================

/// Throttle thresholds and delays per tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Whether the throttle gate and update run at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Consumed-quota percentage above which normal callers delay
    #[serde(default = "default_normal_threshold")]
    pub normal_threshold: f64,

    /// Consumed-quota percentage above which priority callers delay
    #[serde(default = "default_priority_threshold")]
    pub priority_threshold: f64,

    /// Normal tier delay in milliseconds
    #[serde(default)]
    pub normal_delay_ms: Option<DelaySetting>,

    /// Priority tier delay in milliseconds
    #[serde(default)]
    pub priority_delay_ms: Option<DelaySetting>,

    /// File shared by processes throttling the same tenant; in-memory if unset
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_normal_threshold() -> f64 {
    50.0
}

fn default_priority_threshold() -> f64 {
    80.0
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            normal_threshold: default_normal_threshold(),
            priority_threshold: default_priority_threshold(),
            normal_delay_ms: None,
            priority_delay_ms: None,
            store_path: None,
        }
    }
}

impl ThrottleConfig {
    /// Threshold configured for a tier
    pub fn threshold(&self, tier: ThrottleTier) -> f64 {
        match tier {
            ThrottleTier::Normal => self.normal_threshold,
            ThrottleTier::Priority => self.priority_threshold,
        }
    }

    /// Delay applied to a tier while its flag is set.
    ///
    /// Falls back to 500 ms (normal) or 250 ms (priority) when the configured
    /// value is missing or not a valid integer.
    pub fn delay(&self, tier: ThrottleTier) -> Duration {
        let (setting, fallback) = match tier {
            ThrottleTier::Normal => (&self.normal_delay_ms, DEFAULT_NORMAL_DELAY_MS),
            ThrottleTier::Priority => (&self.priority_delay_ms, DEFAULT_PRIORITY_DELAY_MS),
        };
        let millis = setting
            .as_ref()
            .and_then(DelaySetting::millis)
            .unwrap_or(fallback);
        Duration::from_millis(millis)
    }
}

/// Raw delay value as it appears in configuration.
///
/// Environment-driven configs frequently carry numbers as strings, so both
/// shapes are accepted and validated lazily. Any other value (floats,
/// booleans, integers beyond `i64`) is kept and falls back to the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DelaySetting {
    Millis(i64),
    Text(String),
    Other(JsonValue),
}

impl DelaySetting {
    /// Milliseconds, if the setting is a valid non-negative integer
    pub fn millis(&self) -> Option<u64> {
        match self {
            DelaySetting::Millis(ms) => u64::try_from(*ms).ok(),
            DelaySetting::Text(text) => text.trim().parse::<u64>().ok(),
            DelaySetting::Other(_) => None,
        }
    }
}

// ============================================================================
// Telemetry Config
// ============================================================================

/// Telemetry settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// How much of each call is attached to telemetry records
    #[serde(default)]
    pub verbosity: TelemetryVerbosity,
}

/// Payload inclusion level for telemetry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryVerbosity {
    /// Call metadata only
    #[default]
    Minimal,
    /// Metadata plus request and response payloads
    Payloads,
    /// Payloads plus response headers
    Full,
}

impl TelemetryVerbosity {
    /// Whether payloads are attached
    pub fn includes_payloads(self) -> bool {
        matches!(self, Self::Payloads | Self::Full)
    }

    /// Whether response headers are attached
    pub fn includes_headers(self) -> bool {
        matches!(self, Self::Full)
    }
}

// ============================================================================
// Benign Errors
// ============================================================================

/// Maps a flattened error message to a non-error result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenignErrorRule {
    /// Exact flattened error message
    pub message: String,
    /// Result returned instead of failing
    pub result: JsonValue,
}

impl BenignErrorRule {
    /// Create a new rule
    pub fn new(message: impl Into<String>, result: JsonValue) -> Self {
        Self {
            message: message.into(),
            result,
        }
    }
}
