//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! dispatcher. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct MuxConfig {
    /// Name of the registered handler used when no route matches.
    pub fallback: Option<String>,

    /// Invocation boundary settings.
    pub invocation: InvocationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Routes, evaluated in file order.
    pub routes: Vec<RouteConfig>,
}

/// Invocation boundary configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct InvocationConfig {
    /// Deadline for one invocation in seconds (0 = no deadline).
    pub timeout_secs: u64,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// A declarative routing rule.
///
/// Every set pattern must match. `function`, `cluster`, `user` and
/// `database` accept an exact value or a `*` wildcard; the `_regex`
/// variants take a regular expression.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouteConfig {
    /// Route identifier for logs.
    pub name: Option<String>,

    pub function: Option<String>,
    pub function_regex: Option<String>,
    pub cluster: Option<String>,
    pub cluster_regex: Option<String>,
    pub user: Option<String>,
    pub user_regex: Option<String>,
    pub database: Option<String>,
    pub database_regex: Option<String>,

    /// Name of a registered handler.
    pub handler: String,

    /// Wrap the handler in a batching handler.
    pub batch: Option<BatchConfig>,
}

impl RouteConfig {
    /// Identifier for diagnostics: the name, or the position in the file.
    pub fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("routes[{}]", index))
    }
}

/// Sub-batching parameters.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BatchConfig {
    /// Maximum rows per sub-batch (must be positive).
    pub chunk_size: usize,

    /// Collapse rows with identical content.
    #[serde(default)]
    pub distinct: bool,

    /// Maximum sub-batches launched per invocation.
    #[serde(default)]
    pub max_chunk_count: Option<usize>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
