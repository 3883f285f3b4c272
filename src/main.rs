//! Session gateway
//!
//! Browser-facing gateway in front of a session-authenticated backend API.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                   SESSION GATEWAY                     │
//!   Browser request   │  ┌───────────┐   ┌──────┐   ┌──────────────────────┐  │
//!   ──────────────────┼─▶│ request ID│──▶│ CORS │──▶│ /api/auth/*  → auth  │──┼──▶ Backend
//!                     │  │  + trace  │   │      │   │ /api/environment/set │  │    /api/*
//!                     │  └───────────┘   └──────┘   │ /python/*    → proxy │  │
//!                     │                             └──────────┬───────────┘  │
//!                     │       ┌───────────────────┐            │              │
//!                     │       │ session cookies → │◀───────────┤              │
//!                     │       │ X-Session-ID      │            │              │
//!                     │       │ X-User-ID         │   ┌────────▼─────────┐    │
//!                     │       └───────────────────┘   │ environment      │    │
//!                     │                               │ resolver (swap)  │    │
//!                     │                               └──────────────────┘    │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use session_gateway::config::load_config;
use session_gateway::lifecycle::{shutdown_signal, Shutdown};
use session_gateway::observability::{logging, metrics};
use session_gateway::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "session-gateway", version, about = "Session-bridging reverse proxy")]
struct Args {
    /// Path to a TOML configuration file; built-in defaults when omitted
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "session-gateway starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        origins = config.cors.allowed_origins.len(),
        environment = %config.environments.initial,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(e) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    error = %e,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
