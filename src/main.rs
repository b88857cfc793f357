//! Stateless HTTP forwarding proxy.
//!
//! Every inbound request is sent to `TARGET_DOMAIN` with its path and query
//! intact, minus any header named in `REMOVE_HEADERS`, and the upstream
//! response is relayed back unchanged.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                FORWARDING PROXY               │
//!                      │                                               │
//!     Client Request   │  ┌─────────┐   ┌───────────┐   ┌───────────┐  │
//!     ─────────────────┼─▶│  axum   │──▶│  request  │──▶│ upstream  │──┼──▶ Upstream
//!                      │  │ server  │   │ retarget +│   │  client   │  │
//!                      │  └─────────┘   │  filter   │   └─────┬─────┘  │
//!                      │       ▲        └───────────┘         │        │
//!     Client Response  │       │        ┌───────────┐         │        │
//!     ◀────────────────┼───────┴────────│  relay    │◀────────┘        │
//!                      │                └───────────┘                  │
//!                      │   config · observability · lifecycle          │
//!                      └───────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use forward_proxy::config::{load_config, LogFormat};
use forward_proxy::lifecycle::{signals, startup, Shutdown};
use forward_proxy::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "forward-proxy")]
#[command(about = "Forward every request to TARGET_DOMAIN, stripping REMOVE_HEADERS", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; environment variables override it.
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Listener address, overrides file and BIND_ADDRESS.
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Log output format.
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind.to_string();
    }
    if let Some(format) = cli.log_format {
        config.observability.log_format = format;
    }

    init_logging(&config.observability)?;

    tracing::info!("forward-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    startup::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
