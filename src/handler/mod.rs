//! Handler abstraction and its variants.
//!
//! # Data Flow
//! ```text
//! Router selects Arc<dyn UdfHandler>
//!     → HandlerFn        (user function over the whole batch)
//!     → ParallelRowHandler (one task per row → RowHandler)
//!     → BatchHandler     (dedup + chunk → inner UdfHandler per chunk)
//!     → Result<Vec<Value>, HandlerError>
//! ```
//!
//! # Design Decisions
//! - Variants compose by wrapping; `BatchHandler` accepts any `UdfHandler`
//! - Concurrent variants are all-or-nothing: one failed task fails the call
//! - No retries

pub mod batch;
pub mod builtin;
mod group;
pub mod parallel;
pub mod registry;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::dispatch::Context;
use crate::event::{Row, Value};

pub use batch::BatchHandler;
pub use parallel::ParallelRowHandler;
pub use registry::{HandlerRegistry, RegisteredHandler};

/// Errors reported by handlers.
///
/// These are encoded into the failure envelope; they never abort a dispatch.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// No rule matched and no fallback handler was configured.
    #[error("external function `{function}` not match")]
    NoMatch { function: String },

    /// The handler reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The handler stopped early because its context was cancelled.
    #[error("execution cancelled")]
    Cancelled,

    /// Any other error raised by handler code.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Creates a failure with the given message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Creates a no-match error for the given function name.
    pub fn no_match(function: impl Into<String>) -> Self {
        Self::NoMatch {
            function: function.into(),
        }
    }
}

/// Result type for handler execution.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Executes a UDF over a whole batch of rows.
///
/// `results[i]` corresponds to `rows[i]` when the lengths agree; the
/// dispatcher pads or truncates otherwise.
#[async_trait]
pub trait UdfHandler: Send + Sync {
    async fn execute(&self, ctx: &Context, rows: &[Row]) -> HandlerResult<Vec<Value>>;
}

/// Executes a UDF for a single row.
#[async_trait]
pub trait RowHandler: Send + Sync {
    async fn execute_row(&self, ctx: &Context, row: &[Value]) -> HandlerResult<Value>;
}

#[async_trait]
impl<H: UdfHandler + ?Sized> UdfHandler for Arc<H> {
    async fn execute(&self, ctx: &Context, rows: &[Row]) -> HandlerResult<Vec<Value>> {
        (**self).execute(ctx, rows).await
    }
}

#[async_trait]
impl<H: RowHandler + ?Sized> RowHandler for Arc<H> {
    async fn execute_row(&self, ctx: &Context, row: &[Value]) -> HandlerResult<Value> {
        (**self).execute_row(ctx, row).await
    }
}

/// Adapter turning an async function into a [`UdfHandler`].
pub struct HandlerFn<F>(F);

/// Wrap an async function over the whole batch.
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Context, Vec<Row>) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult<Vec<Value>>> + Send,
{
    HandlerFn(f)
}

#[async_trait]
impl<F, Fut> UdfHandler for HandlerFn<F>
where
    F: Fn(Context, Vec<Row>) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult<Vec<Value>>> + Send,
{
    async fn execute(&self, ctx: &Context, rows: &[Row]) -> HandlerResult<Vec<Value>> {
        (self.0)(ctx.clone(), rows.to_vec()).await
    }
}

/// Adapter turning an async function into a [`RowHandler`].
pub struct RowHandlerFn<F>(F);

/// Wrap an async function over a single row.
pub fn row_handler_fn<F, Fut>(f: F) -> RowHandlerFn<F>
where
    F: Fn(Context, Row) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult<Value>> + Send,
{
    RowHandlerFn(f)
}

#[async_trait]
impl<F, Fut> RowHandler for RowHandlerFn<F>
where
    F: Fn(Context, Row) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult<Value>> + Send,
{
    async fn execute_row(&self, ctx: &Context, row: &[Value]) -> HandlerResult<Value> {
        (self.0)(ctx.clone(), row.to_vec()).await
    }
}

/// Handler used when nothing matched and no fallback is configured.
#[derive(Debug, Clone)]
pub(crate) struct NoMatchHandler {
    function: String,
}

impl NoMatchHandler {
    pub(crate) fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
        }
    }
}

#[async_trait]
impl UdfHandler for NoMatchHandler {
    async fn execute(&self, _ctx: &Context, _rows: &[Row]) -> HandlerResult<Vec<Value>> {
        Err(HandlerError::no_match(&self.function))
    }
}
