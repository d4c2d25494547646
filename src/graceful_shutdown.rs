//! Shutdown signal handling

use std::future::pending;

use tokio::signal;

/// Resolves once the process is asked to stop
///
/// Listens to Ctrl+C and, on Unix, to `SIGTERM`
pub async fn handler() {
    let interrupt = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Could not listen for Ctrl+C: {err}");
            pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                tracing::error!("Could not listen for SIGTERM: {err}");
                pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = interrupt => tracing::info!("Interrupted, finishing open requests"),
        () = terminate => tracing::info!("Terminated, finishing open requests"),
    }
}
