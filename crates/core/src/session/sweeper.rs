use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::metrics::SESSIONS_SWEPT;

use super::store::SessionStore;

/// Handle to the background sweeper task.
pub struct SweeperHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for it to exit.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.task.await;
    }
}

/// Periodically remove expired sessions until stopped.
pub fn spawn_sweeper(store: Arc<dyn SessionStore>, interval: Duration) -> SweeperHandle {
    let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

    let task = tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Session sweeper started");
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Session sweeper shutting down");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    match store.sweep() {
                        Ok(0) => {}
                        Ok(removed) => {
                            SESSIONS_SWEPT.inc_by(removed as u64);
                            debug!(removed, "Swept expired sessions");
                        }
                        Err(e) => warn!(error = %e, "Session sweep failed"),
                    }
                }
            }
        }
    });

    SweeperHandle { shutdown_tx, task }
}
