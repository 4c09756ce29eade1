use std::fmt;

use tokio::signal;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    CtrlC,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::CtrlC => f.write_str("Ctrl+C"),
            ShutdownSignal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Resolves once the process is asked to stop. If a listener cannot be
/// installed that source is ignored instead of aborting the server.
pub async fn shutdown_signal() -> ShutdownSignal {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = ctrl_c => ShutdownSignal::CtrlC,
        _ = terminate => ShutdownSignal::Terminate,
    };

    warn!("🛑 {} received, initiating shutdown...", received);
    received
}
