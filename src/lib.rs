//! Redshift Lambda UDF dispatcher library.
//!
//! Routes batched external-function invocations to registered handlers,
//! runs per-row and sub-batched handlers concurrently, and reconciles
//! results into the response envelope.

pub mod config;
pub mod dispatch;
pub mod event;
pub mod handler;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod runtime;

pub use config::schema::MuxConfig;
pub use dispatch::{Context, DispatchError};
pub use event::{Envelope, EventMetadata, Row, UdfEvent, Value};
pub use handler::{HandlerError, HandlerRegistry, RowHandler, UdfHandler};
pub use routing::{Router, Rule};
pub use runtime::Invoker;
