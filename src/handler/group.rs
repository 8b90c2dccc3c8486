//! Fork-join task group with first-error semantics.
//!
//! # Responsibilities
//! - Spawn independent tasks sharing one child cancellation signal
//! - Join every task, handing successful outputs to the caller in completion order
//! - Surface exactly one error: the first failure observed by the join loop
//!
//! # Design Decisions
//! - Cancellation is advisory: tasks are never aborted, only signalled
//! - A panicking task is re-raised on the joining task with its original
//!   payload once the group has drained

use std::any::Any;
use std::future::Future;

use tokio::task::JoinSet;

use crate::dispatch::Context;
use crate::handler::{HandlerError, HandlerResult};

pub(crate) struct TaskGroup<T> {
    ctx: Context,
    tasks: JoinSet<HandlerResult<T>>,
}

impl<T: Send + 'static> TaskGroup<T> {
    /// Create an empty group scoped under `parent`.
    pub(crate) fn new(parent: &Context) -> Self {
        Self {
            ctx: parent.child(),
            tasks: JoinSet::new(),
        }
    }

    /// Context to hand to each task.
    pub(crate) fn context(&self) -> Context {
        self.ctx.clone()
    }

    pub(crate) fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = HandlerResult<T>> + Send + 'static,
    {
        self.tasks.spawn(task);
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every task. `collect` sees each successful output until the
    /// first failure; after that outputs are dropped.
    pub(crate) async fn join<C>(mut self, mut collect: C) -> HandlerResult<()>
    where
        C: FnMut(T),
    {
        let mut first_error: Option<HandlerError> = None;
        let mut panic_payload: Option<Box<dyn Any + Send>> = None;

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(Ok(output)) => {
                    if first_error.is_none() && panic_payload.is_none() {
                        collect(output);
                    }
                }
                Ok(Err(err)) => {
                    if first_error.is_none() {
                        tracing::debug!(error = %err, pending = self.tasks.len(), "Task failed, cancelling group");
                        self.ctx.cancel();
                        first_error = Some(err);
                    }
                }
                Err(join_err) if join_err.is_panic() => {
                    self.ctx.cancel();
                    if panic_payload.is_none() {
                        panic_payload = Some(join_err.into_panic());
                    }
                }
                Err(_) => {
                    if first_error.is_none() {
                        self.ctx.cancel();
                        first_error = Some(HandlerError::Cancelled);
                    }
                }
            }
        }

        if let Some(payload) = panic_payload {
            std::panic::resume_unwind(payload);
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collects_all_outputs() {
        let mut group = TaskGroup::new(&Context::background());
        for i in 0..5u32 {
            group.spawn(async move { Ok(i) });
        }
        assert_eq!(group.len(), 5);
        let mut seen = Vec::new();
        group.join(|i| seen.push(i)).await.unwrap();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_first_failure_cancels_siblings() {
        let parent = Context::background();
        let mut group = TaskGroup::<()>::new(&parent);
        let ctx = group.context();
        group.spawn(async move {
            ctx.cancelled().await;
            Err(HandlerError::Cancelled)
        });
        group.spawn(async { Err(HandlerError::failed("boom")) });

        let err = group.join(|_| {}).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    #[should_panic(expected = "task exploded")]
    async fn test_panic_is_reraised() {
        let mut group = TaskGroup::<()>::new(&Context::background());
        group.spawn(async { panic!("task exploded") });
        let _ = group.join(|_| {}).await;
    }
}
