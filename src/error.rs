//! Error types for resttree
//!
//! This module defines the error hierarchy for the whole client core.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for resttree
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Dispatch Errors
    // ============================================================================
    #[error("Child resource '{name}' is not available for {resource}")]
    UnknownChildResource { name: String, resource: String },

    #[error("No action named '{name}' is defined for {resource}")]
    UnknownAction { name: String, resource: String },

    #[error("{operation} is not available for {resource}")]
    UnsupportedOperation { operation: String, resource: String },

    // ============================================================================
    // Response Errors
    // ============================================================================
    #[error("Request failed with HTTP code {status}")]
    TransportError { status: u16 },

    #[error("API error (HTTP {}): {message}", display_status(.status))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Throttle Store Errors
    // ============================================================================
    #[error("Throttle store error: {message}")]
    Store { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create an unknown child resource error
    pub fn unknown_child(name: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::UnknownChildResource {
            name: name.into(),
            resource: resource.into(),
        }
    }

    /// Create an unknown action error
    pub fn unknown_action(name: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::UnknownAction {
            name: name.into(),
            resource: resource.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(operation: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            resource: resource.into(),
        }
    }

    /// Create an API error from a flattened server message
    pub fn api(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::ApiError {
            message: message.into(),
            status,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a throttle store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// HTTP status attached to this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::TransportError { status } => Some(*status),
            Error::ApiError { status, .. } => *status,
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether a caller could reasonably retry the call.
    ///
    /// The core itself never retries; this only classifies.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            Error::TransportError { status } => is_retryable_status(*status),
            Error::ApiError {
                status: Some(status),
                ..
            } => is_retryable_status(*status),
            _ => false,
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "-".to_string(), |s| s.to_string())
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for resttree
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
