//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming event (cluster, user, database, external_function)
//!     → router.rs (ordered rule scan)
//!     → rule.rs (AND over the rule's matchers)
//!     → matcher.rs (evaluate one attribute)
//!     → Return: selected handler, fallback, or NoMatch handler
//!
//! Rule Compilation (at startup):
//!     field patterns (exact / wildcard / regex)
//!     → compile matchers
//!     → register in order on a Router
//!     → share as Arc<Router>
//! ```
//!
//! # Design Decisions
//! - Rules compiled at registration; bad patterns never reach dispatch
//! - Deterministic: same event always selects the same rule
//! - First match wins (registration order)

pub mod matcher;
pub mod router;
pub mod rule;

use thiserror::Error;

pub use matcher::{Field, Matcher};
pub use router::{Router, Selection};
pub use rule::{Rule, RuleBuilder};

/// Errors raised while building rules.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A regular expression (explicit or translated from a wildcard) did not compile.
    #[error("invalid pattern `{pattern}` for {field}: {source}")]
    InvalidPattern {
        field: Field,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
