//! Shared configuration loading for Storefront services
//!
//! All shared settings use the `STOREFRONT_` prefix for environment variables.
//! A `.env` file in the working directory is honoured when [`load_dotenv`] is
//! called before any loader runs.
//!
//! # Example
//!
//! ```no_run
//! use storefront_core::config::{ConfigLoader, TelemetryConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! storefront_core::config::load_dotenv();
//!
//! let telemetry = TelemetryConfig::from_env()?;
//! telemetry.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::error::CoreError;

/// Configuration loader trait
///
/// Provides standardized methods for loading and validating configuration from
/// environment variables.
pub trait ConfigLoader: Sized {
    /// Load configuration from the environment, falling back to defaults for
    /// optional values.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if a value is present but cannot be parsed.
    fn from_env() -> Result<Self, CoreError>;

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` naming the offending key.
    fn validate(&self) -> Result<(), CoreError>;
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Logging configuration
///
/// # Environment Variables
///
/// - `STOREFRONT_SERVICE_NAME` (optional): Service name attached to the startup record (default: "storefront")
/// - `STOREFRONT_LOG_LEVEL` (optional): Default filter when `RUST_LOG` is unset (default: "info")
/// - `STOREFRONT_LOG_FORMAT` (optional): `json` or `pretty` (default: "pretty")
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "storefront".to_string(),
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl ConfigLoader for TelemetryConfig {
    fn from_env() -> Result<Self, CoreError> {
        let defaults = TelemetryConfig::default();

        let service_name =
            std::env::var("STOREFRONT_SERVICE_NAME").unwrap_or(defaults.service_name);

        let log_level = std::env::var("STOREFRONT_LOG_LEVEL").unwrap_or(defaults.log_level);

        let format = parse_env_var("STOREFRONT_LOG_FORMAT", defaults.format)?;

        Ok(Self {
            service_name,
            log_level,
            format,
        })
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.service_name.trim().is_empty() {
            return Err(CoreError::config(
                "service_name must not be empty",
                "STOREFRONT_SERVICE_NAME",
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(CoreError::config(
                format!(
                    "Invalid log_level '{}'. Must be one of: {}",
                    self.log_level,
                    valid_log_levels.join(", ")
                ),
                "STOREFRONT_LOG_LEVEL",
            ));
        }

        Ok(())
    }
}

/// Parse an environment variable, returning `default` when it is unset
///
/// # Errors
///
/// Returns a `ConfigurationError` if the variable is set but cannot be parsed
pub fn parse_env_var<T>(key: &str, default: T) -> Result<T, CoreError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| CoreError::config(format!("Failed to parse {}: {}", key, e), key))
        })
        .unwrap_or(Ok(default))
}

/// Load .env file if present
///
/// Does not return an error if the file is missing.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_telemetry_config_default() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "storefront");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_telemetry_config_from_env() {
        env::set_var("STOREFRONT_SERVICE_NAME", "recs-test");
        env::set_var("STOREFRONT_LOG_FORMAT", "json");

        let config = TelemetryConfig::from_env().unwrap();
        assert_eq!(config.service_name, "recs-test");
        assert_eq!(config.format, LogFormat::Json);

        env::remove_var("STOREFRONT_SERVICE_NAME");
        env::remove_var("STOREFRONT_LOG_FORMAT");
    }

    #[test]
    fn test_telemetry_config_invalid_log_level() {
        let config = TelemetryConfig {
            log_level: "verbose".to_string(),
            ..TelemetryConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert_eq!(err.key(), Some("STOREFRONT_LOG_LEVEL"));
    }

    #[test]
    fn test_parse_env_var_default() {
        let value: usize = parse_env_var("STOREFRONT_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_var_invalid() {
        env::set_var("STOREFRONT_TEST_BAD_NUMBER", "not-a-number");

        let result: Result<u16, _> = parse_env_var("STOREFRONT_TEST_BAD_NUMBER", 8080);
        assert!(matches!(
            result.unwrap_err(),
            CoreError::ConfigurationError { .. }
        ));

        env::remove_var("STOREFRONT_TEST_BAD_NUMBER");
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
