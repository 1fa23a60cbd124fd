use crate::config::ObservabilityConfig;
use crate::error::{AppError, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// Logs go to stderr so stdout carries only the report. `RUST_LOG`, when
/// set, replaces the configured level.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("port_cluster={}", config.log_level)).map_err(|e| {
            AppError::Configuration(format!(
                "Invalid log level {:?}: {}",
                config.log_level, e
            ))
        })?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| AppError::Configuration(format!("Failed to initialize tracing: {}", e)))
}
