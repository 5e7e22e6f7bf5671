//! Asset-optimizing reverse proxy.
//!
//! ```text
//!     Client ──▶ http server ──▶ pipeline ──▶ origin client ──▶ Origin
//!                                   │
//!                                   ├─ eligible? ──▶ transform (css, js)
//!                                   │
//!                                   └─ cache tree (<root>/<url path>)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use asset_proxy::config::{load_config, ProxyConfig};
use asset_proxy::lifecycle::{wait_for_signal, Shutdown};
use asset_proxy::observability::{logging, metrics};
use asset_proxy::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "asset-proxy", version, about = "Reverse proxy that minifies and caches assets")]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "ASSET_PROXY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "asset-proxy starting");
    tracing::info!(
        config_file = ?cli.config,
        bind_address = %config.listener.bind_address,
        origin = %config.origin.base_url,
        cache_root = %config.cache.root.display(),
        transforms = ?config.transforms.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
