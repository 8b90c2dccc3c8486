//! Invocation boundary.
//!
//! # Data Flow
//! ```text
//! JSON line (stdin)
//!     → invoker.rs (parse event, assign request id, apply deadline)
//!     → Router::handle_event
//!     → envelope JSON or error object (stdout)
//! ```
//!
//! # Design Decisions
//! - One invocation at a time; concurrency lives inside handlers
//! - A deadline cancels the invocation's context before giving up
//! - Handler failures stay inside the envelope; only invalid input,
//!   timeouts and faults become error objects

pub mod invoker;

pub use invoker::{ErrorResponse, InvokeError, Invoker};
