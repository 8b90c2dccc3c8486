//! Execution context passed down the handler chain.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::event::EventMetadata;

/// Per-dispatch execution context.
///
/// Carries the invocation metadata snapshot and an advisory cancellation
/// signal. Cloning is cheap; clones share the same snapshot and token.
#[derive(Debug, Clone, Default)]
pub struct Context {
    metadata: Arc<EventMetadata>,
    cancel: CancellationToken,
}

impl Context {
    /// Context with empty metadata and a fresh token.
    pub fn background() -> Self {
        Self::default()
    }

    /// Context driven by an externally owned cancellation token.
    pub fn with_token(cancel: CancellationToken) -> Self {
        Self {
            metadata: Arc::default(),
            cancel,
        }
    }

    /// Same cancellation signal, new metadata snapshot.
    pub fn with_metadata(&self, metadata: EventMetadata) -> Self {
        Self {
            metadata: Arc::new(metadata),
            cancel: self.cancel.clone(),
        }
    }

    /// Derive a context whose token is cancelled with this one, but which can
    /// also be cancelled on its own without affecting the parent.
    pub fn child(&self) -> Self {
        Self {
            metadata: Arc::clone(&self.metadata),
            cancel: self.cancel.child_token(),
        }
    }

    /// Independent copy of the invocation metadata.
    pub fn metadata(&self) -> EventMetadata {
        EventMetadata::clone(&self.metadata)
    }

    /// Request cooperative cancellation of everything using this context.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_read_is_a_copy() {
        let ctx = Context::background().with_metadata(EventMetadata {
            external_function: "f".into(),
            ..Default::default()
        });
        let mut copy = ctx.metadata();
        copy.external_function = "mutated".into();
        assert_eq!(ctx.metadata().external_function, "f");
    }

    #[test]
    fn test_child_cancellation_is_scoped() {
        let parent = Context::background();
        let child = parent.child();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let child = parent.child();
        parent.cancel();
        assert!(child.is_cancelled());
    }
}
