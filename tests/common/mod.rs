//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;

use service_host::{ServerConfig, ServerHandle, Shutdown};
use tokio::task::JoinHandle;

/// Config bound to an ephemeral localhost port with the given services.
pub fn test_config(services: &[&str]) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.services = services.iter().map(|s| s.to_string()).collect();
    config.observability.metrics_enabled = false;
    config.worker.poll_interval_ms = 20;
    config.timeouts.shutdown_secs = 2;
    config
}

/// A handle serving on a background task.
pub struct RunningHost {
    pub addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningHost {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        self.task.await.unwrap().unwrap();
    }
}

/// Serve `handle` until `RunningHost::stop`.
pub fn spawn_host(handle: ServerHandle) -> RunningHost {
    let addr = handle.local_addr();
    let shutdown = Shutdown::new();
    let mut signal = shutdown.subscribe();

    let task = tokio::spawn(handle.serve(async move {
        let _ = signal.recv().await;
    }));

    RunningHost {
        addr,
        shutdown,
        task,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
