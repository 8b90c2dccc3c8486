//! Request attribute matching.
//!
//! # Responsibilities
//! - Match one event attribute (cluster, user, database, function name)
//! - Exact, `*`-wildcard, explicit regex, or always-true predicates
//! - Compile patterns once, at rule construction
//!
//! # Design Decisions
//! - Wildcards translate to a regex anchored to the whole value; only `*`
//!   is rewritten, other metacharacters keep their regex meaning
//! - Bare `*` is an always-true matcher and is never compiled
//! - Explicit regexes are used as written (unanchored search)
//! - Matching is case-sensitive

use std::fmt;

use regex::Regex;

use crate::event::EventMetadata;
use crate::routing::RouteError;

/// Trait for matching invocations against conditions.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns true if the event matches this condition.
    fn matches(&self, event: &EventMetadata) -> bool;
}

/// Event attribute a matcher inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Cluster,
    User,
    Database,
    ExternalFunction,
}

impl Field {
    /// Read this attribute from the event.
    pub fn value<'a>(&self, event: &'a EventMetadata) -> &'a str {
        match self {
            Field::Cluster => &event.cluster,
            Field::User => &event.user,
            Field::Database => &event.database,
            Field::ExternalFunction => &event.external_function,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Cluster => "cluster",
            Field::User => "user",
            Field::Database => "database",
            Field::ExternalFunction => "external_function",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Matches every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyMatcher;

impl Matcher for AnyMatcher {
    fn matches(&self, _event: &EventMetadata) -> bool {
        true
    }
}

/// Matches when the attribute equals a fixed string.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    field: Field,
    expected: String,
}

impl ExactMatcher {
    pub fn new(field: Field, expected: impl Into<String>) -> Self {
        Self {
            field,
            expected: expected.into(),
        }
    }
}

impl Matcher for ExactMatcher {
    fn matches(&self, event: &EventMetadata) -> bool {
        self.field.value(event) == self.expected
    }
}

/// Matches when the attribute matches a compiled regular expression.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    field: Field,
    regex: Regex,
}

impl RegexMatcher {
    /// Compile `expr` as written.
    pub fn new(field: Field, expr: &str) -> Result<Self, RouteError> {
        let regex = Regex::new(expr).map_err(|source| RouteError::InvalidPattern {
            field,
            pattern: expr.to_string(),
            source,
        })?;
        Ok(Self { field, regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Matcher for RegexMatcher {
    fn matches(&self, event: &EventMetadata) -> bool {
        self.regex.is_match(self.field.value(event))
    }
}

/// Translate a `*` wildcard pattern into an anchored regular expression.
/// The rest of the pattern keeps its regex meaning, so `d.*` matches `dev`.
pub fn wildcard_to_regex(pattern: &str) -> String {
    format!("^(?:{})$", pattern.replace('*', ".*"))
}

/// Build a matcher from an exact or `*`-wildcard pattern.
pub fn pattern(field: Field, pattern: &str) -> Result<Box<dyn Matcher>, RouteError> {
    if pattern == "*" {
        return Ok(Box::new(AnyMatcher));
    }
    if pattern.contains('*') {
        return Ok(Box::new(RegexMatcher::new(field, &wildcard_to_regex(pattern))?));
    }
    Ok(Box::new(ExactMatcher::new(field, pattern)))
}

/// Build a matcher from an explicit regular expression.
pub fn regex(field: Field, expr: &str) -> Result<Box<dyn Matcher>, RouteError> {
    Ok(Box::new(RegexMatcher::new(field, expr)?))
}
