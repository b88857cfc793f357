//! Outbound transport to the upstream service.
//!
//! # Responsibilities
//! - Send one prepared request and hand back the response head with a
//!   streaming body
//! - Own the connection pool and TLS client configuration
//!
//! # Design Decisions
//! - hyper-util's legacy client never follows redirects, so a 3xx reaches
//!   the caller untouched
//! - No timeout or retry at this layer; a failed call is reported once
//! - Dropping the returned future abandons the in-flight request

use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::ClientConfig;
use crate::error::Result;

/// Something that can deliver a request to the upstream service.
pub trait Upstream: Send + Sync + 'static {
    /// Send the request and return the upstream response without buffering its body.
    fn send(
        &self,
        request: Request<Body>,
    ) -> impl Future<Output = Result<Response<Body>>> + Send;
}

type HttpsClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Pooled HTTP/HTTPS client (HTTP/1.1 and HTTP/2 via ALPN).
#[derive(Clone)]
pub struct HttpsUpstream {
    client: HttpsClient,
}

impl HttpsUpstream {
    pub fn new(config: &ClientConfig) -> Self {
        install_crypto_provider();

        let mut http = HttpConnector::new();
        http.set_nodelay(config.tcp_nodelay);
        http.enforce_http(false);

        let https = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .wrap_connector(http);

        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .build(https);

        Self { client }
    }
}

impl Upstream for HttpsUpstream {
    fn send(
        &self,
        request: Request<Body>,
    ) -> impl Future<Output = Result<Response<Body>>> + Send {
        let pending = self.client.request(request);
        async move {
            let response = pending.await?;
            let (parts, body) = response.into_parts();
            Ok(Response::from_parts(parts, Body::new(body)))
        }
    }
}

/// rustls needs a process-wide provider before the first client config is built.
fn install_crypto_provider() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        // Err means another provider is already installed, which is fine.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
