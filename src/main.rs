//! Service host.
//!
//! One process, one listener, any combination of roles.
//!
//! # Architecture Overview
//!
//! ```text
//!   services = ["web", "api", "worker"]
//!        │
//!        ▼
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────────────────────┐
//!   │ alias table  │──▶│   resolver   │──▶│ [web, worker] (deduplicated) │
//!   └──────────────┘   └──────────────┘   └──────────────┬───────────────┘
//!                                                        │
//!                                                        ▼
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────────────────────┐
//!   │   registry   │◀──│   composer   │──▶│ ServerHandle (listener +     │
//!   │ id → mount() │   │ sequential   │   │ root router + tasks)         │
//!   └──────────────┘   └──────────────┘   └──────────────┬───────────────┘
//!                                                        │ serve
//!                                                        ▼
//!                          /api  /collaboration  /admin  + worker loop
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use service_host::config;
use service_host::lifecycle::{self, signals};
use service_host::observability::{logging, metrics};
use service_host::services::AliasTable;

#[derive(Parser)]
#[command(name = "service-host")]
#[command(about = "Mounts the configured services onto one shared listener", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated service list; overrides the file and SERVICES.
    #[arg(short, long)]
    services: Option<String>,

    /// Print the accepted service names and exit.
    #[arg(long)]
    list_services: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_services {
        let aliases = AliasTable::standard();
        for name in aliases.names() {
            if let Ok(id) = aliases.resolve(name) {
                println!("{name:<16} → {id}");
            }
        }
        return ExitCode::SUCCESS;
    }

    let config = match config::resolve_config(cli.config.as_deref(), cli.services.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("service-host: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "service-host starting");

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let started = match lifecycle::start(config).await {
        Ok(started) => started,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = started.handle.serve(signals::shutdown_signal()).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
