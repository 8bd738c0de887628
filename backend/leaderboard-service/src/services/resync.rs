/// Periodic cache rebuild.
///
/// The coordinator never needs a resync for write correctness; this job is
/// the systematic repair path for drift and the recovery path after cache
/// data loss. Runs once at startup and then, when configured, on a fixed
/// interval.
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::LeaderboardService;

pub async fn run_startup_resync(service: &LeaderboardService) {
    match service.resync().await {
        Ok(entries) => tracing::info!(entries, "startup resync complete"),
        // The cache warms itself through the write path; startup can proceed
        // with an empty index.
        Err(e) => tracing::warn!("startup resync failed, serving cold cache: {}", e),
    }
}

pub fn spawn_periodic_resync(
    service: Arc<LeaderboardService>,
    interval_secs: u64,
) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        tracing::info!("periodic resync disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        // First tick fires immediately; startup already resynced.
        interval.tick().await;
        loop {
            interval.tick().await;
            match service.resync().await {
                Ok(entries) => tracing::info!(entries, "periodic resync complete"),
                Err(e) => tracing::warn!("periodic resync failed: {}", e),
            }
        }
    }))
}
