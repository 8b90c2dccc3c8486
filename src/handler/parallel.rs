//! Per-row parallel execution.
//!
//! # Responsibilities
//! - Run a [`RowHandler`] once per row, every row on its own task
//! - Reassemble outputs in row order
//!
//! # Design Decisions
//! - Output slots are positional; each task owns exactly one slot
//! - Unset row handler is a no-op returning nulls, not a configuration error
//! - All-or-nothing: the first failure is returned and partial output discarded

use std::sync::Arc;

use async_trait::async_trait;

use crate::dispatch::Context;
use crate::event::{Row, Value};
use crate::handler::group::TaskGroup;
use crate::handler::{HandlerError, HandlerResult, RowHandler, UdfHandler};

/// Executes a row handler for every row concurrently.
#[derive(Clone, Default)]
pub struct ParallelRowHandler {
    row_handler: Option<Arc<dyn RowHandler>>,
}

impl ParallelRowHandler {
    /// Create a handler that fans rows out to `row_handler`.
    pub fn new(row_handler: impl RowHandler + 'static) -> Self {
        Self::from_arc(Arc::new(row_handler))
    }

    /// Create a handler from an already shared row handler.
    pub fn from_arc(row_handler: Arc<dyn RowHandler>) -> Self {
        Self {
            row_handler: Some(row_handler),
        }
    }

    /// Handler with no row handler; every row resolves to null.
    pub fn unset() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UdfHandler for ParallelRowHandler {
    async fn execute(&self, ctx: &Context, rows: &[Row]) -> HandlerResult<Vec<Value>> {
        let mut results = vec![Value::Null; rows.len()];
        let Some(row_handler) = &self.row_handler else {
            return Ok(results);
        };

        let mut group = TaskGroup::new(ctx);
        for (index, row) in rows.iter().enumerate() {
            let handler = Arc::clone(row_handler);
            let task_ctx = group.context();
            let row = row.clone();
            group.spawn(async move {
                let value = handler.execute_row(&task_ctx, &row).await?;
                Ok::<_, HandlerError>((index, value))
            });
        }

        tracing::trace!(rows = rows.len(), "Spawned row tasks");

        group
            .join(|(index, value)| {
                if let Some(slot) = results.get_mut(index) {
                    *slot = value;
                }
            })
            .await?;

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::row_handler_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn rows(n: usize) -> Vec<Row> {
        (0..n).map(|i| vec![Value::from(i as i64)]).collect()
    }

    #[tokio::test]
    async fn test_unset_handler_returns_nulls() {
        let handler = ParallelRowHandler::unset();
        for n in [0, 1, 7] {
            let results = handler.execute(&Context::background(), &rows(n)).await.unwrap();
            assert_eq!(results, vec![Value::Null; n]);
        }
    }

    #[tokio::test]
    async fn test_rows_run_concurrently() {
        const ROWS: usize = 8;
        let barrier = Arc::new(tokio::sync::Barrier::new(ROWS));
        let handler = ParallelRowHandler::new(row_handler_fn(move |_ctx, row: Row| {
            let barrier = Arc::clone(&barrier);
            async move {
                barrier.wait().await;
                Ok(row[0].clone())
            }
        }));

        let results = tokio::time::timeout(
            Duration::from_secs(5),
            handler.execute(&Context::background(), &rows(ROWS)),
        )
        .await
        .expect("every row task must be in flight at once")
        .unwrap();
        assert_eq!(results, rows(ROWS).into_iter().map(|r| r[0].clone()).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_results_keep_row_order() {
        // Later rows finish first.
        let handler = ParallelRowHandler::new(row_handler_fn(|_ctx, row: Row| async move {
            let i = row[0].as_i64().unwrap_or_default();
            tokio::time::sleep(Duration::from_millis(20 - i as u64 * 4)).await;
            Ok(Value::from(format!("row{}", i)))
        }));
        let results = handler.execute(&Context::background(), &rows(5)).await.unwrap();
        let expected: Vec<Value> = (0..5).map(|i| Value::from(format!("row{}", i))).collect();
        assert_eq!(results, expected);
    }

    #[tokio::test]
    async fn test_single_failure_fails_whole_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handler = ParallelRowHandler::new(row_handler_fn(move |_ctx, row: Row| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if row[0].as_i64() == Some(2) {
                    Err(HandlerError::failed("invalid"))
                } else {
                    Ok(Value::from("ok"))
                }
            }
        }));
        let err = handler.execute(&Context::background(), &rows(4)).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_many_failures_surface_one_error() {
        let handler = ParallelRowHandler::new(row_handler_fn(|_ctx, row: Row| async move {
            Err::<Value, _>(HandlerError::failed(format!("bad row {}", row[0])))
        }));
        let err = handler.execute(&Context::background(), &rows(3)).await.unwrap_err();
        assert!(err.to_string().starts_with("bad row "));
    }

    #[tokio::test]
    async fn test_failure_signals_cooperating_rows() {
        let handler = ParallelRowHandler::new(row_handler_fn(|ctx: Context, row: Row| async move {
            if row[0].as_i64() == Some(0) {
                return Err(HandlerError::failed("first"));
            }
            ctx.cancelled().await;
            Err(HandlerError::Cancelled)
        }));
        let err = handler.execute(&Context::background(), &rows(3)).await.unwrap_err();
        assert_eq!(err.to_string(), "first");
    }

    #[tokio::test]
    async fn test_rows_see_invocation_metadata() {
        let ctx = Context::background().with_metadata(crate::event::EventMetadata {
            user: "alice".into(),
            ..Default::default()
        });
        let handler = ParallelRowHandler::new(row_handler_fn(|ctx: Context, _row: Row| async move {
            Ok(Value::from(ctx.metadata().user))
        }));
        let results = handler.execute(&ctx, &rows(2)).await.unwrap();
        assert_eq!(results, vec![Value::from("alice"), Value::from("alice")]);
    }
}
