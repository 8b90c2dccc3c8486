//! Named handlers available to declarative routes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::{ParallelRowHandler, RowHandler, UdfHandler};

/// A handler registered under a name.
#[derive(Clone)]
pub enum RegisteredHandler {
    /// Operates on the whole batch.
    Udf(Arc<dyn UdfHandler>),
    /// Operates on one row; wrapped in a [`ParallelRowHandler`] when routed.
    Row(Arc<dyn RowHandler>),
}

impl RegisteredHandler {
    /// Resolve to a whole-batch handler.
    pub fn into_udf(self) -> Arc<dyn UdfHandler> {
        match self {
            RegisteredHandler::Udf(handler) => handler,
            RegisteredHandler::Row(handler) => Arc::new(ParallelRowHandler::from_arc(handler)),
        }
    }
}

/// Map of handler name → handler, filled by the application before routes
/// are compiled.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, RegisteredHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a whole-batch handler, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, handler: impl UdfHandler + 'static) -> &mut Self {
        self.handlers
            .insert(name.into(), RegisteredHandler::Udf(Arc::new(handler)));
        self
    }

    /// Register a per-row handler, replacing any previous entry.
    pub fn register_row(&mut self, name: impl Into<String>, handler: impl RowHandler + 'static) -> &mut Self {
        self.handlers
            .insert(name.into(), RegisteredHandler::Row(Arc::new(handler)));
        self
    }

    pub fn get(&self, name: &str) -> Option<RegisteredHandler> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
