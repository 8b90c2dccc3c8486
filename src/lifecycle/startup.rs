//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve route handler names against the registry
//! - Wrap batched routes in a [`BatchHandler`]
//! - Compile route patterns into a [`Router`]
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Routes keep their file order, so the first matching route wins

use std::num::NonZeroUsize;
use std::sync::Arc;

use thiserror::Error;

use crate::config::schema::{BatchConfig, MuxConfig, RouteConfig};
use crate::handler::{BatchHandler, HandlerRegistry, UdfHandler};
use crate::routing::{Field, RouteError, Router, Rule};

/// Errors raised while assembling the router.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("route `{route}` references unknown handler `{handler}`")]
    UnknownHandler { route: String, handler: String },

    #[error("fallback references unknown handler `{0}`")]
    UnknownFallback(String),

    #[error("route `{route}`: {reason}")]
    InvalidBatch { route: String, reason: &'static str },

    #[error("route `{route}`: {source}")]
    Route {
        route: String,
        #[source]
        source: RouteError,
    },
}

/// Build a router from validated configuration.
///
/// # Errors
///
/// Returns `StartupError` when a handler name is not registered or a
/// route cannot be compiled.
pub fn build_router(config: &MuxConfig, registry: &HandlerRegistry) -> Result<Router, StartupError> {
    let mut router = Router::new();

    for (index, route) in config.routes.iter().enumerate() {
        let label = route.label(index);
        let rule = build_rule(&label, route, registry)?;
        tracing::debug!(
            route = %label,
            handler = %route.handler,
            matchers = rule.matcher_count(),
            batched = route.batch.is_some(),
            "Route registered"
        );
        router.register(rule);
    }

    if let Some(name) = &config.fallback {
        let handler = registry
            .get(name)
            .ok_or_else(|| StartupError::UnknownFallback(name.clone()))?;
        router.set_fallback_arc(handler.into_udf());
    }

    tracing::info!(
        routes = router.rules().len(),
        fallback = router.has_fallback(),
        "Router built"
    );
    Ok(router)
}

fn build_rule(label: &str, route: &RouteConfig, registry: &HandlerRegistry) -> Result<Rule, StartupError> {
    let registered = registry
        .get(&route.handler)
        .ok_or_else(|| StartupError::UnknownHandler {
            route: label.to_string(),
            handler: route.handler.clone(),
        })?;

    let mut handler = registered.into_udf();
    if let Some(batch) = &route.batch {
        handler = Arc::new(batch_handler(label, batch, handler)?);
    }

    let mut builder = Rule::builder().name(label).handler_arc(handler);
    let patterns = [
        (Field::ExternalFunction, &route.function, &route.function_regex),
        (Field::Cluster, &route.cluster, &route.cluster_regex),
        (Field::User, &route.user, &route.user_regex),
        (Field::Database, &route.database, &route.database_regex),
    ];
    for (field, pattern, expr) in patterns {
        if let Some(pattern) = pattern {
            builder = builder.field(field, pattern.clone());
        }
        if let Some(expr) = expr {
            builder = builder.field_regex(field, expr.clone());
        }
    }

    builder.build().map_err(|source| StartupError::Route {
        route: label.to_string(),
        source,
    })
}

fn batch_handler(
    label: &str,
    config: &BatchConfig,
    inner: Arc<dyn UdfHandler>,
) -> Result<BatchHandler, StartupError> {
    let invalid = |reason| StartupError::InvalidBatch {
        route: label.to_string(),
        reason,
    };

    let chunk_size = NonZeroUsize::new(config.chunk_size).ok_or_else(|| invalid("chunk_size must be greater than 0"))?;
    let mut handler = BatchHandler::from_arc(chunk_size, inner).distinct(config.distinct);
    if let Some(max) = config.max_chunk_count {
        let max = NonZeroUsize::new(max).ok_or_else(|| invalid("max_chunk_count must be greater than 0"))?;
        handler = handler.max_chunk_count(max);
    }
    Ok(handler)
}
