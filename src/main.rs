//! Route registry server.
//!
//! Serves the route management API over HTTP and persists route
//! definitions to a flat TOML file.
//!
//! ```text
//!   client ──HTTP──▶ api handlers ──▶ validation ──▶ RouteService ──▶ FileRouteRepository ──▶ routes.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use route_registry::config::{load_config, validate_config, ConfigError, RegistryConfig};
use route_registry::lifecycle::{spawn_signal_handler, Shutdown};
use route_registry::observability::init_logging;
use route_registry::HttpServer;

#[derive(Parser)]
#[command(name = "route-registry")]
#[command(about = "CRUD registry of reverse-proxy route definitions", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override `storage.path`.
    #[arg(short, long)]
    data: Option<PathBuf>,
}

fn resolve_config(args: Args) -> Result<RegistryConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RegistryConfig::default(),
    };

    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(data) = args.data {
        config.storage.path = data;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(Args::parse())?;

    init_logging(&config.observability);

    tracing::info!("route-registry v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        storage = %config.storage.path.display(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    spawn_signal_handler(Arc::clone(&shutdown));

    HttpServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
