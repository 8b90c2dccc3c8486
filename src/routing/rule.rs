//! Rules: a conjunction of matchers bound to a handler.

use std::sync::Arc;

use crate::event::EventMetadata;
use crate::handler::{ParallelRowHandler, RowHandler, UdfHandler};
use crate::routing::matcher::{self, Field, Matcher};
use crate::routing::RouteError;

/// A single routing rule.
///
/// Matches iff every matcher matches; a rule without matchers matches every
/// event. A rule without a handler never wins selection.
pub struct Rule {
    name: Option<String>,
    matchers: Vec<Box<dyn Matcher>>,
    handler: Option<Arc<dyn UdfHandler>>,
}

impl Rule {
    /// Start building a rule.
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    /// Returns true if all matchers accept the event.
    pub fn matches(&self, event: &EventMetadata) -> bool {
        self.matchers.iter().all(|m| m.matches(event))
    }

    pub fn handler(&self) -> Option<&Arc<dyn UdfHandler>> {
        self.handler.as_ref()
    }

    /// Name used in logs, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn matcher_count(&self) -> usize {
        self.matchers.len()
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("matchers", &self.matchers)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
enum Pattern {
    Wildcard(String),
    Regex(String),
}

/// Collects field patterns; compilation happens in [`RuleBuilder::build`].
#[derive(Default)]
pub struct RuleBuilder {
    name: Option<String>,
    patterns: Vec<(Field, Pattern)>,
    handler: Option<Arc<dyn UdfHandler>>,
}

impl RuleBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Constrain a field by exact value or `*` wildcard.
    pub fn field(mut self, field: Field, pattern: impl Into<String>) -> Self {
        self.patterns.push((field, Pattern::Wildcard(pattern.into())));
        self
    }

    /// Constrain a field by regular expression.
    pub fn field_regex(mut self, field: Field, expr: impl Into<String>) -> Self {
        self.patterns.push((field, Pattern::Regex(expr.into())));
        self
    }

    pub fn function(self, pattern: impl Into<String>) -> Self {
        self.field(Field::ExternalFunction, pattern)
    }

    pub fn function_regex(self, expr: impl Into<String>) -> Self {
        self.field_regex(Field::ExternalFunction, expr)
    }

    pub fn cluster(self, pattern: impl Into<String>) -> Self {
        self.field(Field::Cluster, pattern)
    }

    pub fn cluster_regex(self, expr: impl Into<String>) -> Self {
        self.field_regex(Field::Cluster, expr)
    }

    pub fn user(self, pattern: impl Into<String>) -> Self {
        self.field(Field::User, pattern)
    }

    pub fn user_regex(self, expr: impl Into<String>) -> Self {
        self.field_regex(Field::User, expr)
    }

    pub fn database(self, pattern: impl Into<String>) -> Self {
        self.field(Field::Database, pattern)
    }

    pub fn database_regex(self, expr: impl Into<String>) -> Self {
        self.field_regex(Field::Database, expr)
    }

    /// Bind a whole-batch handler.
    pub fn handler(mut self, handler: impl UdfHandler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Bind an already shared handler.
    pub fn handler_arc(mut self, handler: Arc<dyn UdfHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Bind a per-row handler, executed through a [`ParallelRowHandler`].
    pub fn row_handler(self, handler: impl RowHandler + 'static) -> Self {
        self.handler(ParallelRowHandler::new(handler))
    }

    /// Compile all patterns.
    ///
    /// # Errors
    ///
    /// Returns `RouteError::InvalidPattern` for the first pattern that does
    /// not compile.
    pub fn build(self) -> Result<Rule, RouteError> {
        let matchers = self
            .patterns
            .iter()
            .map(|(field, pattern)| match pattern {
                Pattern::Wildcard(p) => matcher::pattern(*field, p),
                Pattern::Regex(expr) => matcher::regex(*field, expr),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Rule {
            name: self.name,
            matchers,
            handler: self.handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::builtin::Echo;

    fn event() -> EventMetadata {
        EventMetadata {
            cluster: "dummy".into(),
            user: "test".into(),
            database: "dev".into(),
            external_function: "test_udf".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_rule_matches_everything() {
        let rule = Rule::builder().handler(Echo).build().unwrap();
        assert_eq!(rule.matcher_count(), 0);
        assert!(rule.matches(&event()));
        assert!(rule.matches(&EventMetadata::default()));
    }

    #[test]
    fn test_all_matchers_must_pass() {
        let rule = Rule::builder()
            .function("*")
            .cluster("d*")
            .database("dev")
            .user_regex("t.*")
            .build()
            .unwrap();
        assert!(rule.matches(&event()));

        let rule = Rule::builder().function("*").cluster("hoge").build().unwrap();
        assert!(!rule.matches(&event()));
    }

    #[test]
    fn test_build_rejects_bad_regex() {
        let result = Rule::builder().function("f").cluster_regex("[").build();
        assert!(matches!(result, Err(RouteError::InvalidPattern { field: Field::Cluster, .. })));
    }

    #[test]
    fn test_rule_without_handler() {
        let rule = Rule::builder().name("empty").function("*").build().unwrap();
        assert!(rule.handler().is_none());
        assert_eq!(rule.name(), Some("empty"));
    }
}
