//! Metrics collection.
//!
//! # Metrics
//! - `udf_dispatch_total` (counter): dispatches by outcome
//!   (`success`, `handler_error`, `fault`)
//! - `udf_dispatch_duration_seconds` (histogram): handler execution time
//! - `udf_reconciled_total` (counter): results by shape
//!   (`exact`, `padded`, `truncated`)
//! - `udf_batch_chunks_total` (counter): sub-batches launched
//! - `udf_batch_rows_shed_total` (counter): unique rows left null by the
//!   chunk limit
//!
//! Recording is a no-op until the embedding application installs a recorder.

use std::time::Instant;

use crate::dispatch::Shape;

/// Record the outcome and latency of one dispatch.
pub fn record_dispatch(outcome: &'static str, start: Instant) {
    metrics::counter!("udf_dispatch_total", "outcome" => outcome).increment(1);
    metrics::histogram!("udf_dispatch_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_reconcile(shape: Shape) {
    metrics::counter!("udf_reconciled_total", "kind" => shape.as_str()).increment(1);
}

/// Record launched sub-batches and rows dropped by the chunk limit.
pub fn record_batch(chunks: usize, shed_rows: usize) {
    metrics::counter!("udf_batch_chunks_total").increment(chunks as u64);
    if shed_rows > 0 {
        metrics::counter!("udf_batch_rows_shed_total").increment(shed_rows as u64);
    }
}
