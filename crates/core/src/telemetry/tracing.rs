//! Tracing subscriber configuration and initialization

use crate::config::{ConfigLoader, LogFormat, TelemetryConfig};
use crate::error::CoreError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the level filter: `RUST_LOG` wins, otherwise the configured level
pub fn build_env_filter(config: &TelemetryConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Initialize the global tracing subscriber
///
/// Must be called once at process startup.
///
/// # Errors
///
/// Returns error if:
/// - Configuration is invalid
/// - A global subscriber is already installed
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), CoreError> {
    config.validate()?;

    let subscriber = tracing_subscriber::registry().with(build_env_filter(config));

    match config.format {
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true);

            subscriber
                .with(fmt_layer)
                .try_init()
                .map_err(|e| CoreError::TelemetryInit(e.to_string()))?;
        }
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true);

            subscriber
                .with(fmt_layer)
                .try_init()
                .map_err(|e| CoreError::TelemetryInit(e.to_string()))?;
        }
    }

    ::tracing::info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        "Logging initialized"
    );

    Ok(())
}
