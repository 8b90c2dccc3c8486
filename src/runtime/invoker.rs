//! Event invocation and the JSON-lines serving loop.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::schema::InvocationConfig;
use crate::dispatch::{Context, DispatchError};
use crate::event::UdfEvent;
use crate::routing::Router;

/// Errors that replace the envelope for one invocation.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("invalid event: {0}")]
    InvalidEvent(#[from] serde_json::Error),

    #[error("invocation timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Fault(#[from] DispatchError),
}

impl InvokeError {
    /// Error class reported in [`ErrorResponse::error_type`].
    pub fn error_type(&self) -> &'static str {
        match self {
            InvokeError::InvalidEvent(_) => "InvalidEvent",
            InvokeError::Timeout(_) => "Timeout",
            InvokeError::Fault(_) => "Fault",
        }
    }
}

/// Invocation-level error object written in place of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_type: String,
    pub error_message: String,
}

impl From<&InvokeError> for ErrorResponse {
    fn from(err: &InvokeError) -> Self {
        Self {
            error_type: err.error_type().to_string(),
            error_message: err.to_string(),
        }
    }
}

/// Runs events through a router.
#[derive(Debug, Clone)]
pub struct Invoker {
    router: Arc<Router>,
    timeout: Option<Duration>,
}

impl Invoker {
    /// Create a new invoker from invocation settings.
    pub fn new(router: impl Into<Arc<Router>>, config: &InvocationConfig) -> Self {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        Self::with_timeout(router, timeout)
    }

    /// Create a new invoker with an explicit deadline (`None` = unbounded).
    pub fn with_timeout(router: impl Into<Arc<Router>>, timeout: Option<Duration>) -> Self {
        Self {
            router: router.into(),
            timeout,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Handle one JSON event and return the envelope JSON.
    ///
    /// # Errors
    ///
    /// Returns `InvokeError` when the payload does not parse, the deadline
    /// passes, or the handler faults.
    pub async fn invoke(&self, payload: &str) -> Result<String, InvokeError> {
        let mut event: UdfEvent = serde_json::from_str(payload)?;
        if event.metadata.request_id.is_empty() {
            event.metadata.request_id = Uuid::new_v4().to_string();
        }

        let ctx = Context::background();
        let dispatch = self.router.handle_event(&ctx, &event);
        let body = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, dispatch).await {
                Ok(body) => body?,
                Err(_) => {
                    ctx.cancel();
                    tracing::warn!(
                        request_id = %event.metadata.request_id,
                        function = %event.metadata.external_function,
                        timeout_ms = limit.as_millis() as u64,
                        "Invocation timed out"
                    );
                    return Err(InvokeError::Timeout(limit));
                }
            },
            None => dispatch.await?,
        };
        Ok(body)
    }

    /// Serve newline-delimited events until EOF or shutdown.
    ///
    /// Every non-blank input line produces exactly one output line.
    /// Returns the number of invocations served.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W, shutdown: CancellationToken) -> io::Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut served = 0;

        loop {
            let line = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::info!(served, "Shutdown requested, stopping invocation loop");
                    break;
                }
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                tracing::debug!(served, "Input closed");
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let response = match self.invoke(&line).await {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!(error_type = err.error_type(), error = %err, "Invocation failed");
                    serde_json::to_string(&ErrorResponse::from(&err))?
                }
            };
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
            served += 1;
        }

        Ok(served)
    }
}
