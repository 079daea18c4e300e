//! Multi-Asset Payment Gateway
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                   PAYMENT GATEWAY                     │
//!                      │                                                       │
//!   HTTP request       │  ┌─────────┐    ┌────────────┐    ┌──────────────┐   │
//!   ───────────────────┼─▶│  http   │───▶│  gateway   │───▶│    rails     │   │
//!                      │  │ router  │    │ dispatcher │    │ builder      │   │
//!                      │  └─────────┘    │ + caches   │    │ broadcast    │   │
//!                      │                 └────────────┘    │ oracle       │   │
//!                      │                                   └──────┬───────┘   │
//!                      │                                          │           │
//!                      │                                          ▼           │
//!                      │                                   ┌──────────────┐   │
//!                      │                                   │  blockchain  │───┼──▶ RPC nodes
//!                      │                                   │ client, index│───┼──▶ transfer API
//!                      │                                   └──────────────┘   │
//!                      │  ┌────────────────────────────────────────────────┐ │
//!                      │  │ config · observability · lifecycle             │ │
//!                      │  └────────────────────────────────────────────────┘ │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use payment_gateway::blockchain::{BlockchainClient, HttpTransferSource, TransferSource};
use payment_gateway::config::load_config;
use payment_gateway::lifecycle::{wait_for_termination, Shutdown};
use payment_gateway::observability::{logging, metrics};
use payment_gateway::{Gateway, HttpServer};

#[derive(Parser)]
#[command(name = "payment-gateway")]
#[command(about = "Multi-asset transaction gateway", long_about = None)]
struct Args {
    /// TOML configuration file; defaults and GATEWAY_* variables apply without one.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "payment-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        chain_id = config.blockchain.chain_id,
        native = %config.native.symbol,
        tokens = config.tokens.supported.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let client = Arc::new(BlockchainClient::new(config.blockchain.clone()).await?);
    let transfer_source = match &config.tokens.transfer_api_url {
        Some(url) => {
            let source = HttpTransferSource::new(url.clone(), config.tokens.transfer_api_timeout_secs)?;
            tracing::info!(url = %url, "Token transfers resolved through external index");
            Some(Arc::new(source) as Arc<dyn TransferSource>)
        }
        None => None,
    };

    let gateway = Arc::new(Gateway::new(&config, client.clone(), client, transfer_source)?);
    let server = HttpServer::new(gateway, &config.listener);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_termination().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
