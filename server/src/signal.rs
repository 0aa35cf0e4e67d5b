use tracing::{info, warn};

/// Resolves on Ctrl+C, or on SIGTERM where that exists.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    signal_result = tokio::signal::ctrl_c() => log_ctrl_c(signal_result),
                    _ = terminate.recv() => {
                        info!("received SIGTERM");
                    }
                }
            }
            Err(err) => {
                warn!("failed to install SIGTERM handler: {}", err);
                log_ctrl_c(tokio::signal::ctrl_c().await);
            }
        }
    }

    #[cfg(not(unix))]
    {
        log_ctrl_c(tokio::signal::ctrl_c().await);
    }
}

fn log_ctrl_c(result: std::io::Result<()>) {
    match result {
        Ok(()) => info!("received Ctrl+C"),
        Err(err) => warn!("failed to listen for Ctrl+C: {}", err),
    }
}
