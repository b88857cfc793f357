//! Startup orchestration.
//!
//! # Responsibilities
//! - Report the effective forwarding settings
//! - Start background tasks (metrics exporter)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast on anything that prevents serving (bind errors)
//! - A missing upstream is not fatal; requests get a configuration error
//! - Listener starts last (traffic only when ready)

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::http::{ForwardingConfig, HttpServer};
use crate::lifecycle::Shutdown;

/// Log what the handler will do with each request.
pub fn log_forwarding_summary(config: &ProxyConfig) {
    let forwarding = ForwardingConfig::from_config(&config.upstream);
    let removed: Vec<&str> = forwarding
        .removed_headers()
        .iter()
        .map(|name| name.as_str())
        .collect();

    match forwarding.upstream() {
        Ok(base) => tracing::info!(
            upstream = %base,
            removed_headers = ?removed,
            "Forwarding configured"
        ),
        Err(e) => tracing::error!(
            error = %e,
            "Upstream not configured; every request will be answered with 500"
        ),
    }
}

/// Bring the proxy up and serve until `shutdown` fires.
pub async fn run(config: ProxyConfig, shutdown: &Shutdown) -> Result<(), std::io::Error> {
    log_forwarding_summary(&config);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => crate::observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let server = HttpServer::new(config);
    server.run(listener, shutdown.signalled()).await
}
