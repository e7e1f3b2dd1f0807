use tokio::sync::broadcast;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};
#[cfg(unix)]
use tracing::warn;

/// Shutdown signal types
#[derive(Debug, Clone, Copy)]
pub enum ShutdownSignal {
    /// Graceful shutdown (drain connections)
    Graceful,
}

/// Setup signal handlers for the server
///
/// Returns a broadcast sender for shutdown signals and a join handle for the signal task.
/// SIGTERM and SIGINT both trigger a graceful shutdown. If they cannot be
/// installed, Ctrl+C is used instead.
#[cfg(unix)]
pub fn setup_signal_handlers() -> (broadcast::Sender<ShutdownSignal>, tokio::task::JoinHandle<()>) {
    spawn_signal_task(install_unix_signals())
}

#[cfg(unix)]
fn install_unix_signals() -> std::io::Result<(Signal, Signal)> {
    Ok((
        signal(SignalKind::terminate())?,
        signal(SignalKind::interrupt())?,
    ))
}

#[cfg(unix)]
fn spawn_signal_task(
    signals: std::io::Result<(Signal, Signal)>,
) -> (broadcast::Sender<ShutdownSignal>, tokio::task::JoinHandle<()>) {
    let (shutdown_tx, _) = broadcast::channel(4);
    let tx_clone = shutdown_tx.clone();
    let mut manual_rx = shutdown_tx.subscribe();

    let handle = tokio::spawn(async move {
        let received = match signals {
            Ok((mut sigterm, mut sigint)) => tokio::select! {
                _ = sigterm.recv() => {
                    info!("SIGTERM received, initiating graceful shutdown");
                    true
                }
                _ = sigint.recv() => {
                    info!("SIGINT received, initiating graceful shutdown");
                    true
                }
                // Manual trigger, e.g. from tests
                _ = wait_for_send(&mut manual_rx) => false,
            },
            Err(e) => {
                warn!("Failed to install SIGTERM/SIGINT handlers, using Ctrl+C: {}", e);
                tokio::select! {
                    result = tokio::signal::ctrl_c() => match result {
                        Ok(()) => {
                            info!("Ctrl+C received, initiating graceful shutdown");
                            true
                        }
                        Err(e) => {
                            error!("Failed to listen for Ctrl+C, only manual shutdown remains: {}", e);
                            wait_for_send(&mut manual_rx).await;
                            false
                        }
                    },
                    _ = wait_for_send(&mut manual_rx) => false,
                }
            }
        };

        if received {
            let _ = tx_clone.send(ShutdownSignal::Graceful);
        }
    });

    (shutdown_tx, handle)
}

/// Ctrl+C only on platforms without unix signals
#[cfg(not(unix))]
pub fn setup_signal_handlers() -> (broadcast::Sender<ShutdownSignal>, tokio::task::JoinHandle<()>) {
    let (shutdown_tx, _) = broadcast::channel(4);
    let tx_clone = shutdown_tx.clone();
    let mut rx = shutdown_tx.subscribe();

    let handle = tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => {
                    info!("Ctrl+C received, initiating shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                }
                Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
            },
            _ = rx.recv() => {}
        }
    });

    (shutdown_tx, handle)
}

#[cfg(unix)]
async fn wait_for_send(rx: &mut broadcast::Receiver<ShutdownSignal>) {
    let _ = rx.recv().await;
}
