//! TTL Sweeper Task
//!
//! Background task that periodically removes expired cache entries along
//! with their tag associations. Correctness never depends on it: stale
//! entries are already replaced on their next access. Sweeping only bounds
//! the memory held by entries nobody asks for again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Cache;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. It acquires the store write lock only for the duration
/// of each sweep.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_sweeper_task(cache: Arc<Cache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "starting TTL sweeper task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.store.write().await.sweep_expired();

            if removed > 0 {
                info!(removed, "TTL sweep removed expired entries");
            } else {
                debug!("TTL sweep found no expired entries");
            }
        }
    })
}
