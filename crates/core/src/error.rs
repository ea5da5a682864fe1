//! Error types shared by Storefront crates

use thiserror::Error;

/// Errors raised by the shared configuration and telemetry layers
#[derive(Debug, Error)]
pub enum CoreError {
    /// A configuration value is missing, unparsable or out of range
    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        /// Environment variable or config key that caused the failure
        key: Option<String>,
    },

    #[error("Failed to initialize tracing subscriber: {0}")]
    TelemetryInit(String),
}

impl CoreError {
    /// Shorthand for a configuration error tied to a key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Key attached to a configuration error, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::ConfigurationError { key, .. } => key.as_deref(),
            Self::TelemetryInit(_) => None,
        }
    }
}
