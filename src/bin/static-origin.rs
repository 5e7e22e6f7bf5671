//! File server with ETag revalidation, for use as a local origin.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use asset_proxy::config::ObservabilityConfig;
use asset_proxy::lifecycle::wait_for_signal;
use asset_proxy::observability::logging;
use asset_proxy::validation::static_origin;

#[derive(Debug, Parser)]
#[command(name = "static-origin", version, about = "Serve a directory with ETags")]
struct Cli {
    /// Directory to serve.
    #[arg(long, default_value = "public")]
    root: PathBuf,

    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(&ObservabilityConfig::default())?;

    let listener = TcpListener::bind(&cli.bind).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        root = %cli.root.display(),
        "Static origin listening"
    );

    axum::serve(listener, static_origin(cli.root))
        .with_graceful_shutdown(wait_for_signal())
        .await?;
    Ok(())
}
