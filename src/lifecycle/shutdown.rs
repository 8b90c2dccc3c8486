//! Shutdown coordination.

use tokio_util::sync::CancellationToken;

/// Create a token that is cancelled when the process receives Ctrl+C.
///
/// Must be called from within a Tokio runtime.
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => {
                        tracing::info!("Shutdown signal received");
                        trigger.cancel();
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
                }
            }
            _ = trigger.cancelled() => {}
        }
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_starts_live_and_cancels() {
        let token = shutdown_token();
        assert!(!token.is_cancelled());
        token.cancel();
        token.cancelled().await;
    }
}
