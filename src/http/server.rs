//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router that sends every method and path to the forwarder
//! - Wire up middleware (tracing)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::handler::Forwarder;
use crate::http::request::ForwardingConfig;
use crate::http::upstream::{HttpsUpstream, Upstream};
use crate::observability::events::{EventSink, TracingSink};

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server that forwards over the pooled HTTPS client and logs
    /// events through `tracing`.
    pub fn new(config: ProxyConfig) -> Self {
        let upstream = HttpsUpstream::new(&config.upstream.client);
        let sink: Arc<dyn EventSink> = Arc::new(TracingSink);
        Self::with_parts(config, upstream, sink)
    }

    /// Create a server with a caller-supplied transport and event sink.
    pub fn with_parts<U: Upstream>(config: ProxyConfig, upstream: U, sink: Arc<dyn EventSink>) -> Self {
        let forwarding = ForwardingConfig::from_config(&config.upstream);
        let forwarder = Arc::new(Forwarder::new(forwarding, upstream, sink));
        let router = build_router(forwarder);
        Self { router }
    }

    /// Run the server until `shutdown` resolves, then drain in-flight requests.
    ///
    /// Pass [`Shutdown::signalled`](crate::lifecycle::Shutdown::signalled).
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router<U: Upstream>(forwarder: Arc<Forwarder<U>>) -> Router {
    Router::new()
        .route("/{*path}", any(proxy_handler::<U>))
        .route("/", any(proxy_handler::<U>))
        .with_state(forwarder)
        .layer(TraceLayer::new_for_http())
}

/// Main proxy handler.
async fn proxy_handler<U: Upstream>(
    State(forwarder): State<Arc<Forwarder<U>>>,
    request: Request<Body>,
) -> Response {
    forwarder.handle(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;
    use crate::observability::events::MemorySink;
    use axum::http::StatusCode;
    use std::time::Duration;
    use tower::ServiceExt;

    #[tokio::test]
    async fn unconfigured_server_answers_every_path() {
        let server = HttpServer::with_parts(
            ProxyConfig::default(),
            HttpsUpstream::new(&Default::default()),
            Arc::new(MemorySink::new()),
        );

        for uri in ["/", "/deep/path?x=1", "/admin"] {
            let response = server
                .router()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[tokio::test]
    async fn run_returns_once_shutdown_fires() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let shutdown = Shutdown::new();
        let server = HttpServer::new(ProxyConfig::default());
        let task = tokio::spawn(server.run(listener, shutdown.signalled()));

        shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("server should stop after shutdown")
            .unwrap();
        assert!(result.is_ok());
    }
}
