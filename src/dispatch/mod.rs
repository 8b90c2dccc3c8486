//! Top-level dispatch.
//!
//! # Data Flow
//! ```text
//! UdfEvent
//!     → Router::select (rule / fallback / NoMatch)
//!     → handler.execute(Context{metadata snapshot}, rows)   [panics intercepted]
//!     → reconcile.rs (pad / truncate to num_records)
//!     → Envelope (success or failure)
//! ```
//!
//! # Failure Classes
//! - Handler error → failure envelope, dispatch still succeeds
//! - Panic with an error payload → `DispatchError::Fault`
//! - Any other panic → re-raised to the caller

pub mod context;
pub mod fault;
pub mod reconcile;

use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures_util::FutureExt;
use thiserror::Error;
use tracing::Instrument;

use crate::event::{Envelope, UdfEvent};
use crate::observability::metrics;
use crate::routing::Router;

pub use context::Context;
pub use reconcile::{reconcile, Shape};

/// Errors that abort a dispatch instead of producing an envelope.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Handler code panicked with an error value.
    #[error("{message}")]
    Fault { message: String },

    /// The envelope could not be serialized.
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Router {
    /// Route an event, run the selected handler and build the envelope.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Fault` when the handler panics with an error
    /// payload. Handler failures are reported inside the envelope instead.
    pub async fn dispatch(&self, ctx: &Context, event: &UdfEvent) -> Result<Envelope, DispatchError> {
        let start = Instant::now();
        let metadata = &event.metadata;
        let expected = event.expected_rows();
        let selection = self.select(metadata);
        let ctx = ctx.with_metadata(metadata.clone());

        let span = tracing::debug_span!(
            "dispatch",
            request_id = %metadata.request_id,
            function = %metadata.external_function,
            rule = ?selection.rule_index,
        );
        let outcome = AssertUnwindSafe(selection.handler.execute(&ctx, &event.arguments))
            .catch_unwind()
            .instrument(span)
            .await;

        match outcome {
            Ok(Ok(results)) => {
                let produced = results.len();
                let (results, shape) = reconcile(results, expected);
                if shape != Shape::Exact {
                    tracing::debug!(
                        request_id = %metadata.request_id,
                        produced,
                        expected,
                        shape = shape.as_str(),
                        "Reconciled result length"
                    );
                }
                metrics::record_reconcile(shape);
                metrics::record_dispatch("success", start);
                Ok(Envelope::success(results))
            }
            Ok(Err(err)) => {
                tracing::warn!(
                    request_id = %metadata.request_id,
                    function = %metadata.external_function,
                    error = %err,
                    "Handler failed"
                );
                metrics::record_dispatch("handler_error", start);
                Ok(Envelope::failure(err.to_string()))
            }
            Err(payload) => {
                tracing::error!(
                    request_id = %metadata.request_id,
                    function = %metadata.external_function,
                    "Handler panicked"
                );
                metrics::record_dispatch("fault", start);
                Err(fault::escalate(payload))
            }
        }
    }

    /// [`Router::dispatch`] followed by serialization of the envelope.
    pub async fn handle_event(&self, ctx: &Context, event: &UdfEvent) -> Result<String, DispatchError> {
        let envelope = self.dispatch(ctx, event).await?;
        Ok(envelope.to_json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventMetadata, Row, Value};
    use crate::handler::HandlerError;

    fn event(rows: usize, expected: usize) -> UdfEvent {
        UdfEvent {
            metadata: EventMetadata {
                request_id: "r-1".into(),
                external_function: "f".into(),
                num_records: expected,
                ..Default::default()
            },
            arguments: vec![vec![Value::from(1)]; rows],
        }
    }

    fn echo_count(extra: usize) -> Router {
        let mut router = Router::new();
        router
            .handle_fn("*", move |_ctx, rows: Vec<Row>| async move {
                Ok((0..rows.len() + extra).map(|i| Value::from(i as i64)).collect())
            })
            .unwrap();
        router
    }

    #[tokio::test]
    async fn test_success_envelope_is_reconciled() {
        let envelope = echo_count(1).dispatch(&Context::background(), &event(2, 2)).await.unwrap();
        assert_eq!(envelope, Envelope::success(vec![Value::from(0), Value::from(1)]));

        let envelope = echo_count(0).dispatch(&Context::background(), &event(2, 4)).await.unwrap();
        assert_eq!(envelope.num_records, Some(4));
        assert_eq!(envelope.results.unwrap()[3], Value::Null);
    }

    #[tokio::test]
    async fn test_handler_error_stays_in_envelope() {
        let mut router = Router::new();
        router
            .handle_fn("*", |_ctx, _rows: Vec<Row>| async move {
                Err::<Vec<Value>, _>(HandlerError::failed("invalid"))
            })
            .unwrap();
        let json = router.handle_event(&Context::background(), &event(1, 1)).await.unwrap();
        assert_eq!(json, r#"{"success":false,"error_msg":"invalid"}"#);
    }

    #[tokio::test]
    async fn test_handler_sees_event_metadata() {
        let mut router = Router::new();
        router
            .handle_fn("*", |ctx: Context, _rows: Vec<Row>| async move {
                let metadata = ctx.metadata();
                Ok(vec![Value::from(metadata.request_id), Value::from(metadata.num_records as u64)])
            })
            .unwrap();
        let envelope = router.dispatch(&Context::background(), &event(0, 2)).await.unwrap();
        assert_eq!(envelope.results.unwrap(), vec![Value::from("r-1"), Value::from(2u64)]);
    }

    #[tokio::test]
    async fn test_error_panic_becomes_fault() {
        let mut router = Router::new();
        router
            .handle_fn("*", |_ctx, _rows: Vec<Row>| async move {
                std::panic::panic_any(HandlerError::failed("hoge hoge panic"))
            })
            .unwrap();
        let err = router.dispatch(&Context::background(), &event(2, 2)).await.unwrap_err();
        assert_eq!(err.to_string(), "hoge hoge panic");
    }

    #[tokio::test]
    #[should_panic(expected = "not an error")]
    async fn test_other_panic_propagates() {
        let mut router = Router::new();
        router
            .handle_fn("*", |_ctx, _rows: Vec<Row>| async move {
                panic!("not an error")
            })
            .unwrap();
        let _ = router.dispatch(&Context::background(), &event(1, 1)).await;
    }
}
