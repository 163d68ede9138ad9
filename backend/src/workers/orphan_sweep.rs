use crate::store::DynStore;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

/// Background worker that removes applications whose job no longer exists
///
/// Job deletion removes applications before the job itself; if the second
/// step fails or races with a new submission, this sweep cleans up after it.
/// An interval of zero disables the worker.
pub async fn orphan_sweep_worker(
    store: DynStore,
    interval_seconds: u64,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
) {
    if interval_seconds == 0 {
        info!("Orphan sweep worker disabled");
        return;
    }

    let mut sweep_interval = interval(Duration::from_secs(interval_seconds));
    info!("Orphan sweep worker started (runs every {} seconds)", interval_seconds);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Orphan sweep worker shutting down");
                break;
            }
            _ = sweep_interval.tick() => {
                match store.delete_orphaned_applications().await {
                    Ok(count) => {
                        if count > 0 {
                            info!("Removed {} orphaned applications", count);
                        }
                    }
                    Err(e) => {
                        error!("Failed to sweep orphaned applications: {}", e);
                    }
                }
            }
        }
    }

    info!("Orphan sweep worker stopped");
}
