//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (chunk sizes > 0)
//! - Check that every pattern compiles
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MuxConfig → Result<(), Vec<ValidationError>>
//! - Handler names are resolved later, against the registry, at startup

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::{MuxConfig, RouteConfig};
use crate::routing::matcher::wildcard_to_regex;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{route}: handler name is empty")]
    EmptyHandler { route: String },

    #[error("{route}: chunk_size must be greater than 0")]
    ZeroChunkSize { route: String },

    #[error("{route}: max_chunk_count must be greater than 0")]
    ZeroMaxChunkCount { route: String },

    #[error("{route}: invalid {field} pattern `{pattern}`: {reason}")]
    InvalidPattern {
        route: String,
        field: &'static str,
        pattern: String,
        reason: String,
    },

    #[error("fallback handler name is empty")]
    EmptyFallback,

    #[error("invalid log level `{0}`")]
    InvalidLogLevel(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &MuxConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if matches!(&config.fallback, Some(name) if name.trim().is_empty()) {
        errors.push(ValidationError::EmptyFallback);
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    for (index, route) in config.routes.iter().enumerate() {
        validate_route(&route.label(index), route, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(label: &str, route: &RouteConfig, errors: &mut Vec<ValidationError>) {
    if route.handler.trim().is_empty() {
        errors.push(ValidationError::EmptyHandler {
            route: label.to_string(),
        });
    }

    if let Some(batch) = &route.batch {
        if batch.chunk_size == 0 {
            errors.push(ValidationError::ZeroChunkSize {
                route: label.to_string(),
            });
        }
        if batch.max_chunk_count == Some(0) {
            errors.push(ValidationError::ZeroMaxChunkCount {
                route: label.to_string(),
            });
        }
    }

    let wildcards = [
        ("function", &route.function),
        ("cluster", &route.cluster),
        ("user", &route.user),
        ("database", &route.database),
    ];
    for (field, pattern) in wildcards {
        if let Some(pattern) = pattern.as_deref().filter(|p| p.contains('*') && *p != "*") {
            check_regex(label, field, pattern, &wildcard_to_regex(pattern), errors);
        }
    }

    let regexes = [
        ("function_regex", &route.function_regex),
        ("cluster_regex", &route.cluster_regex),
        ("user_regex", &route.user_regex),
        ("database_regex", &route.database_regex),
    ];
    for (field, expr) in regexes {
        if let Some(expr) = expr.as_deref() {
            check_regex(label, field, expr, expr, errors);
        }
    }
}

fn check_regex(
    label: &str,
    field: &'static str,
    pattern: &str,
    compiled: &str,
    errors: &mut Vec<ValidationError>,
) {
    if let Err(err) = regex::Regex::new(compiled) {
        errors.push(ValidationError::InvalidPattern {
            route: label.to_string(),
            field,
            pattern: pattern.to_string(),
            reason: err.to_string(),
        });
    }
}
