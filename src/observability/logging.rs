//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Route every log line to stderr; stdout carries only the export
//! - Configure log level from config, `--verbose` or `RUST_LOG`
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for machine collection, pretty format for operators
//! - `RUST_LOG` wins over the configured level

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Default filter directive for a configured level.
pub fn default_directive(level: &str, verbose: bool) -> String {
    let level = if verbose { "debug" } else { level };
    format!("cold_storage={},boc_verify={}", level, level)
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig, verbose: bool) -> Result<(), TryInitError> {
    let directive = default_directive(&config.log_level, verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| directive.into());

    let json_layer = config
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!config.json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(
            default_directive("warn", false),
            "cold_storage=warn,boc_verify=warn"
        );
        assert_eq!(
            default_directive("warn", true),
            "cold_storage=debug,boc_verify=debug"
        );
    }
}
