//! The forwarding pipeline.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → check upstream setting (ConfigurationError → 500 with message)
//!     → resolve target URI (upstream scheme+authority, inbound path+query)
//!     → filter headers (only when a removal list is configured)
//!     → send upstream (no redirects followed)
//!     → relay response (status, headers, streaming body)
//! any error → 500, detail recorded, never sent to the caller
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    http::{header, Request, Response},
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;
use crate::http::request::{filter_headers, resolve_target, ForwardingConfig};
use crate::http::response::{relay, status_text};
use crate::http::upstream::Upstream;
use crate::observability::events::{headers_to_json, EventSink, ProxyEvent};
use crate::observability::metrics;

/// Forwards each request to the configured upstream.
///
/// Holds only read-only state; one instance serves all concurrent requests.
pub struct Forwarder<U> {
    config: ForwardingConfig,
    upstream: U,
    sink: Arc<dyn EventSink>,
}

impl<U: Upstream> Forwarder<U> {
    pub fn new(config: ForwardingConfig, upstream: U, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            upstream,
            sink,
        }
    }

    /// Handle one request. Always produces a response.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let request_id = Uuid::new_v4();
        let method = request.method().to_string();

        let response = match self.forward(request_id, request).await {
            Ok(response) => response,
            Err(err) => {
                metrics::record_error(err.kind());
                self.sink.record(ProxyEvent::Failure {
                    request_id,
                    kind: err.kind().to_string(),
                    error: err.to_string(),
                });
                err.into_response()
            }
        };

        metrics::record_request(&method, response.status().as_u16(), start);
        response
    }

    /// The pipeline proper; errors are converted by [`Forwarder::handle`].
    pub async fn forward(
        &self,
        request_id: Uuid,
        request: Request<Body>,
    ) -> Result<Response<Body>> {
        let base = self.config.upstream()?;

        self.sink.record(ProxyEvent::Inbound {
            request_id,
            method: request.method().to_string(),
            url: request.uri().to_string(),
            headers: headers_to_json(request.headers()),
            timestamp: Utc::now(),
        });

        let (mut parts, body) = request.into_parts();
        let target = resolve_target(base, &parts.uri)?;

        let removed = self.config.removed_headers();
        let mut headers = if removed.is_empty() {
            std::mem::take(&mut parts.headers)
        } else {
            let filtered = filter_headers(&parts.headers, removed);
            metrics::record_removed_headers(filtered.removed.len());
            for name in &filtered.removed {
                self.sink.record(ProxyEvent::HeaderRemoved {
                    request_id,
                    name: name.as_str().to_string(),
                });
            }
            filtered.headers
        };
        // Names the proxy, not the upstream; the client derives it from the target.
        headers.remove(header::HOST);

        let mut outbound = Request::builder()
            .method(parts.method)
            .uri(target)
            .body(body)?;
        *outbound.headers_mut() = headers;

        self.sink.record(ProxyEvent::Outbound {
            request_id,
            method: outbound.method().to_string(),
            url: outbound.uri().to_string(),
            headers: headers_to_json(outbound.headers()),
            timestamp: Utc::now(),
        });

        let response = self.upstream.send(outbound).await?;

        self.sink.record(ProxyEvent::Response {
            request_id,
            status: response.status().as_u16(),
            status_text: status_text(&response),
            headers: headers_to_json(response.headers()),
            timestamp: Utc::now(),
        });

        Ok(relay(response))
    }
}
