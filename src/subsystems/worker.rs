//! Worker subsystem.
//!
//! # Responsibilities
//! - Run the background job loop on its own tokio task
//! - Stop when the server handle broadcasts shutdown
//!
//! Claims no routes; mounting only starts the loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::config::WorkerConfig;
use crate::http::server::ServerHandle;
use crate::observability::metrics;
use crate::services::{MountError, ServiceId, Subsystem};

#[derive(Debug)]
pub struct WorkerService {
    config: WorkerConfig,
    heartbeats: Arc<AtomicU64>,
}

impl WorkerService {
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            config,
            heartbeats: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Loop iterations completed so far.
    pub fn heartbeats(&self) -> u64 {
        self.heartbeats.load(Ordering::Relaxed)
    }
}

impl Subsystem for WorkerService {
    fn id(&self) -> ServiceId {
        ServiceId::Worker
    }

    fn path_prefix(&self) -> Option<&'static str> {
        None
    }

    fn mount(&self, handle: &mut ServerHandle) -> Result<(), MountError> {
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let shutdown = handle.shutdown_signal();
        handle.spawn("worker-loop", run(interval, self.heartbeats.clone(), shutdown))
    }
}

async fn run(interval: Duration, heartbeats: Arc<AtomicU64>, mut shutdown: broadcast::Receiver<()>) {
    tracing::info!(interval_ms = interval.as_millis() as u64, "Worker loop starting");
    let mut ticker = time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let count = heartbeats.fetch_add(1, Ordering::Relaxed) + 1;
                metrics::record_worker_heartbeat();
                tracing::trace!(heartbeat = count, "Worker tick");
            }
            _ = shutdown.recv() => {
                tracing::info!("Worker received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
