//! Rule lookup.
//!
//! # Responsibilities
//! - Store compiled rules in registration order
//! - Select the handler for an event (first match wins)
//! - Fall back to the configured fallback, or an explicit NoMatch handler
//!
//! # Design Decisions
//! - Registration needs `&mut Router`; dispatch only needs `&Router`, so a
//!   router shared through `Arc` can no longer change
//! - O(n) scan over rules (typical rule counts are small)

use std::future::Future;
use std::sync::Arc;

use crate::dispatch::Context;
use crate::event::{EventMetadata, Row, Value};
use crate::handler::{
    handler_fn, row_handler_fn, HandlerResult, NoMatchHandler, ParallelRowHandler, RowHandler,
    UdfHandler,
};
use crate::routing::rule::Rule;
use crate::routing::RouteError;

/// Ordered rule set with an optional fallback handler.
#[derive(Default)]
pub struct Router {
    rules: Vec<Rule>,
    fallback: Option<Arc<dyn UdfHandler>>,
}

/// Outcome of handler selection.
pub struct Selection {
    pub handler: Arc<dyn UdfHandler>,
    /// Position of the winning rule; `None` for fallback or no-match.
    pub rule_index: Option<usize>,
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Rules are evaluated in the order they were registered.
    pub fn register(&mut self, rule: Rule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Handler used when no rule matches.
    pub fn set_fallback(&mut self, handler: impl UdfHandler + 'static) -> &mut Self {
        self.fallback = Some(Arc::new(handler));
        self
    }

    pub fn set_fallback_arc(&mut self, handler: Arc<dyn UdfHandler>) -> &mut Self {
        self.fallback = Some(handler);
        self
    }

    /// Register `handler` for function names matching `function` (exact or
    /// `*` wildcard).
    pub fn handle(
        &mut self,
        function: &str,
        handler: impl UdfHandler + 'static,
    ) -> Result<&mut Self, RouteError> {
        let rule = Rule::builder().function(function).handler(handler).build()?;
        Ok(self.register(rule))
    }

    /// Register an async function over the whole batch.
    pub fn handle_fn<F, Fut>(&mut self, function: &str, f: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(Context, Vec<Row>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<Vec<Value>>> + Send,
    {
        self.handle(function, handler_fn(f))
    }

    /// Register a per-row handler, executed in parallel across rows.
    pub fn handle_row(
        &mut self,
        function: &str,
        handler: impl RowHandler + 'static,
    ) -> Result<&mut Self, RouteError> {
        self.handle(function, ParallelRowHandler::new(handler))
    }

    /// Register an async function over a single row, executed in parallel
    /// across rows.
    pub fn handle_row_fn<F, Fut>(&mut self, function: &str, f: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(Context, Row) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<Value>> + Send,
    {
        self.handle_row(function, row_handler_fn(f))
    }

    /// Select the handler for an event.
    pub fn select(&self, event: &EventMetadata) -> Selection {
        let matched = self.rules.iter().enumerate().find_map(|(index, rule)| {
            if !rule.matches(event) {
                return None;
            }
            rule.handler().map(|handler| (index, Arc::clone(handler)))
        });

        if let Some((index, handler)) = matched {
            tracing::debug!(
                function = %event.external_function,
                rule = index,
                rule_name = self.rules[index].name().unwrap_or(""),
                "Rule matched"
            );
            return Selection {
                handler,
                rule_index: Some(index),
            };
        }

        let handler = match &self.fallback {
            Some(fallback) => {
                tracing::debug!(function = %event.external_function, "No rule matched, using fallback");
                Arc::clone(fallback)
            }
            None => {
                tracing::debug!(function = %event.external_function, "No rule matched");
                Arc::new(NoMatchHandler::new(&event.external_function))
            }
        };
        Selection {
            handler,
            rule_index: None,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("rules", &self.rules)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}
