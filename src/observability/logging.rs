//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Pick the log level from `RUST_LOG`, falling back to configuration
//! - Emit human-readable or JSON lines to stderr

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter `{filter}`: {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Build the level filter: `RUST_LOG` when set, otherwise the configured level.
///
/// A malformed `RUST_LOG` is an error rather than a silent fallback.
pub fn env_filter(config: &ObservabilityConfig) -> Result<EnvFilter, LoggingError> {
    let env_override = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    select_filter(env_override.as_deref(), config)
}

fn select_filter(env_override: Option<&str>, config: &ObservabilityConfig) -> Result<EnvFilter, LoggingError> {
    let filter = env_override
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(&config.log_level);
    EnvFilter::try_new(filter).map_err(|source| LoggingError::Filter {
        filter: filter.to_string(),
        source,
    })
}

/// Install the global subscriber.
pub fn init(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let filter = env_filter(config)?;

    let json = (config.log_format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
    });
    let pretty = (config.log_format == LogFormat::Pretty)
        .then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()?;

    tracing::debug!(
        level = %config.log_level,
        format = ?config.log_format,
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = ObservabilityConfig {
            log_level: "udf_mux=verbose".to_string(),
            ..Default::default()
        };
        assert!(matches!(env_filter(&config), Err(LoggingError::Filter { .. })));
    }

    #[test]
    fn test_malformed_env_override_rejected() {
        let err = select_filter(Some("udf_mux=verbose"), &ObservabilityConfig::default()).unwrap_err();
        assert!(matches!(err, LoggingError::Filter { ref filter, .. } if filter == "udf_mux=verbose"));
    }

    #[test]
    fn test_env_override_wins_over_config() {
        let config = ObservabilityConfig {
            log_level: "udf_mux=verbose".to_string(),
            ..Default::default()
        };
        assert!(select_filter(Some("debug"), &config).is_ok());
        assert!(select_filter(Some(" "), &config).is_err());
        assert!(select_filter(None, &ObservabilityConfig::default()).is_ok());
    }

    #[test]
    fn test_default_level_accepted() {
        assert!(env_filter(&ObservabilityConfig::default()).is_ok());
    }
}
