//! # Storefront Core
//!
//! Shared building blocks for Storefront services.
//!
//! ## Modules
//!
//! - `config`: Environment-driven configuration loading and validation
//! - `error`: Error types and handling
//! - `telemetry`: Structured logging setup

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{load_dotenv, parse_env_var, ConfigLoader, LogFormat, TelemetryConfig};
pub use error::CoreError;
pub use telemetry::init_tracing;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
