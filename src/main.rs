//! Response negotiation service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (timeout, request id, trace)
//!                         │
//!                         ▼
//!                     service::router ──▶ negotiation::Negotiator
//!                         │                  (query > extension > Accept > Html)
//!                         ▼
//!                     action (demo catalogue)
//!                         │
//!                         ▼
//!                     service::filter (fault translation, view/format substitution)
//!                         │
//!                         ▼
//!     Client Response  http::response::SerializedResult
//!     ◀────────────────  (envelope → JSON | JS callback | XML | CSV, headers)
//! ```

use std::path::PathBuf;

use clap::Parser;

use response_negotiation::config::{load_config, ServiceConfig};
use response_negotiation::lifecycle::{wait_for_signal, Shutdown};
use response_negotiation::observability::{init_logging, init_metrics};
use response_negotiation::{demo, HttpServer};

#[derive(Debug, Parser)]
#[command(name = "response-negotiation", version, about = "Serve the demo catalogue in any negotiated representation")]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "response-negotiation starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        query_parameter = %config.negotiation.query_parameter,
        request_timeout_secs = config.timeouts.request_secs,
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

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config.clone(), demo::service(&config));
    let mut serving = tokio::spawn(server.serve(shutdown.subscribe()));

    tokio::select! {
        result = &mut serving => result??,
        _ = wait_for_signal() => {
            shutdown.trigger();
            serving.await??;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
