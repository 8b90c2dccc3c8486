//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Resolve handlers → Build router
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C received → Cancel token → Stop reading events → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then router, then the invocation loop
//! - In-flight invocations finish before the loop exits

pub mod shutdown;
pub mod startup;

pub use shutdown::shutdown_token;
pub use startup::{build_router, StartupError};
