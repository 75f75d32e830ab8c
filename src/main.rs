//! SOAP 1.1 RPC endpoint.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────┐
//!                  │                  SOAP ENDPOINT                   │
//!   HTTP POST      │  ┌────────┐   ┌────────────┐   ┌──────────────┐  │
//!  ────────────────┼─▶│  http  │──▶│  dispatch  │──▶│   routing    │  │
//!                  │  │ server │   │ (blocking) │   │ SOAPAction → │  │
//!                  │  └────────┘   └─────┬──────┘   │  operation   │  │
//!                  │                     │          └──────────────┘  │
//!                  │                     ▼                            │
//!                  │  ┌──────────┐   ┌──────────────────────────┐     │
//!  ◀───────────────┼──│ envelope │◀──│ service (instance, call) │     │
//!   text/xml       │  │ encode   │   └──────────────────────────┘     │
//!                  │  └──────────┘                                    │
//!                  │  config · lifecycle · observability              │
//!                  └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use soap_service::config::{load_config, override_bind_address, ServerConfig};
use soap_service::demo::Login;
use soap_service::lifecycle::{wait_for_signal, Shutdown};
use soap_service::observability::{init_logging, init_metrics};
use soap_service::{register_operations, HttpServer};

#[derive(Parser)]
#[command(name = "soap-service")]
#[command(about = "SOAP 1.1 RPC endpoint", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config = override_bind_address(config, bind)?;
    }

    init_logging(&config.observability)?;

    tracing::info!("soap-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        path = %config.endpoint.path,
        request_timeout_secs = config.timeouts.request_secs,
        strict_decoding = config.dispatch.strict_decoding,
        unknown_action = ?config.dispatch.unknown_action,
        "Configuration loaded"
    );

    // Refuse to start on an invalid service definition
    let dispatcher = register_operations::<Login>(config.dispatch.clone())?;

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    let server = HttpServer::new(config, dispatcher);
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
