//! priority-router server binary.
//!
//! Hosts the demo licenses API behind the priority router.

mod licenses;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use priority_router::config::{load_config, validate_config, ConfigError, RouterConfig};
use priority_router::dispatch::RouterBuilder;
use priority_router::lifecycle::{wait_for_signal, Shutdown};
use priority_router::observability::{init_logging, init_metrics};
use priority_router::HttpServer;

use crate::licenses::{licenses_api, LicenseStore};

#[derive(Debug, Parser)]
#[command(name = "priority-router", version, about = "Priority-ordered HTTP request router")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "priority-router starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_size = config.limits.max_body_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut builder = RouterBuilder::new(config.dispatch.clone());
    builder.mount(licenses_api(Arc::new(LicenseStore::default())))?;
    let router = builder.build();
    for route in router.describe() {
        tracing::debug!(route = %route, "Route available");
    }
    tracing::info!(routes = router.len(), "Router built");

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(config, router).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
