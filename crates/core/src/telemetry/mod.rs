//! Structured logging setup
//!
//! Installs a `tracing` subscriber with an `EnvFilter` and either a JSON or a
//! human-readable `fmt` layer.
//!
//! # Example
//!
//! ```rust,no_run
//! use storefront_core::config::TelemetryConfig;
//! use storefront_core::telemetry::init_tracing;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_tracing(&TelemetryConfig::default())?;
//!     Ok(())
//! }
//! ```

pub mod tracing;

pub use self::tracing::{build_env_filter, init_tracing};
