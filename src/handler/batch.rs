//! Deduplicating sub-batch execution.
//!
//! # Data Flow
//! ```text
//! rows[0..N]
//!     → BatchPlan (unique rows in first-seen order + original indexes of each)
//!     → chunks of chunk_size unique rows, at most max_chunk_count launched
//!     → inner handler per chunk, concurrently
//!     → chunk result j written to every original index of unique row j
//! ```
//!
//! # Design Decisions
//! - Without `distinct` every row is its own group (re-chunking only)
//! - The plan is built before any task starts and is read-only afterwards
//! - Rows of chunks beyond `max_chunk_count` stay null; this is not an error

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;

use crate::dispatch::Context;
use crate::event::{Row, Value};
use crate::handler::group::TaskGroup;
use crate::handler::{HandlerError, HandlerResult, UdfHandler};
use crate::observability::metrics;

/// Splits a batch into (optionally deduplicated) sub-batches for an inner
/// handler.
#[derive(Clone)]
pub struct BatchHandler {
    inner: Arc<dyn UdfHandler>,
    chunk_size: NonZeroUsize,
    distinct: bool,
    max_chunk_count: Option<NonZeroUsize>,
}

impl BatchHandler {
    /// Create a batching wrapper with the given sub-batch size.
    pub fn new(chunk_size: NonZeroUsize, inner: impl UdfHandler + 'static) -> Self {
        Self::from_arc(chunk_size, Arc::new(inner))
    }

    /// Create a batching wrapper around an already shared handler.
    pub fn from_arc(chunk_size: NonZeroUsize, inner: Arc<dyn UdfHandler>) -> Self {
        Self {
            inner,
            chunk_size,
            distinct: false,
            max_chunk_count: None,
        }
    }

    /// Collapse rows with identical content into one inner call slot.
    pub fn distinct(mut self, enable: bool) -> Self {
        self.distinct = enable;
        self
    }

    /// Change the sub-batch size.
    pub fn chunk_size(mut self, size: NonZeroUsize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Cap the number of sub-batches launched per call.
    pub fn max_chunk_count(mut self, max: NonZeroUsize) -> Self {
        self.max_chunk_count = Some(max);
        self
    }
}

/// Unique rows and, for each, the original indexes that share it.
#[derive(Debug, Default, PartialEq)]
struct BatchPlan {
    unique: Vec<Row>,
    targets: Vec<Vec<usize>>,
}

impl BatchPlan {
    fn build(rows: &[Row], distinct: bool) -> Self {
        if !distinct {
            return Self {
                unique: rows.to_vec(),
                targets: (0..rows.len()).map(|i| vec![i]).collect(),
            };
        }

        let mut plan = Self::default();
        let mut seen: HashMap<&[Value], usize> = HashMap::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let slot = *seen.entry(row.as_slice()).or_insert_with(|| {
                plan.unique.push(row.clone());
                plan.targets.push(Vec::new());
                plan.unique.len() - 1
            });
            plan.targets[slot].push(index);
        }
        plan
    }
}

#[async_trait]
impl UdfHandler for BatchHandler {
    async fn execute(&self, ctx: &Context, rows: &[Row]) -> HandlerResult<Vec<Value>> {
        let mut results = vec![Value::Null; rows.len()];
        let plan = BatchPlan::build(rows, self.distinct);
        let chunk_size = self.chunk_size.get();
        let total_chunks = plan.unique.len().div_ceil(chunk_size);
        let launch = self
            .max_chunk_count
            .map_or(total_chunks, |max| total_chunks.min(max.get()));

        let mut group = TaskGroup::new(ctx);
        for (chunk_index, chunk) in plan.unique.chunks(chunk_size).take(launch).enumerate() {
            let inner = Arc::clone(&self.inner);
            let task_ctx = group.context();
            let chunk = chunk.to_vec();
            let offset = chunk_index * chunk_size;
            group.spawn(async move {
                let values = inner.execute(&task_ctx, &chunk).await?;
                Ok::<_, HandlerError>((offset, chunk.len(), values))
            });
        }

        let shed_rows = plan.unique.len().saturating_sub(launch * chunk_size);
        tracing::debug!(
            rows = rows.len(),
            unique = plan.unique.len(),
            chunks = group.len(),
            shed_rows,
            "Dispatching sub-batches"
        );
        metrics::record_batch(group.len(), shed_rows);

        let targets = &plan.targets;
        group
            .join(|(offset, len, values)| {
                for (j, value) in values.into_iter().take(len).enumerate() {
                    let Some(indexes) = targets.get(offset + j) else {
                        continue;
                    };
                    for &index in indexes {
                        if let Some(slot) = results.get_mut(index) {
                            *slot = value.clone();
                        }
                    }
                }
            })
            .await?;

        Ok(results)
    }
}
