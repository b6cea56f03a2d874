//! Tracing subscriber setup
//!
//! Filtering follows `RUST_LOG` when set, otherwise `TelemetryConfig::default_directive`.

use taiji_core::{TaijiError, TaijiResult};
use tracing_subscriber::EnvFilter;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, one line per event
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub default_directive: String,
    pub format: LogFormat,
    /// Include the event's module path
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            default_directive: "info".to_string(),
            format: LogFormat::Text,
            with_target: false,
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &TelemetryConfig) -> TaijiResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_directive))
        .map_err(|e| TaijiError::Config(format!("invalid log filter: {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);

    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| TaijiError::Config(format!("tracing already initialized: {e}")))
}

