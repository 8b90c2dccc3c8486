//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events, stderr)
//!     → metrics.rs (counters and histograms via the `metrics` facade)
//!
//! Consumers:
//!     → Log aggregation (stderr of the invoked process)
//!     → Whatever recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - stdout is reserved for responses; logs never go there
//! - Request ID is a field on every dispatch event

pub mod logging;
pub mod metrics;
