//! Shutdown signal handling.

/// Resolves on Ctrl+C
///
/// If the handler cannot be installed, the error is logged and the server
/// keeps running until it is killed.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal, shutting down..."),
        Err(e) => {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
