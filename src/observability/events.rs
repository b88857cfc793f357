//! Per-request proxy events and the sink they are written to.
//!
//! # Responsibilities
//! - Describe what happened to each request (inbound, removed headers,
//!   outbound, response, contained failure)
//! - Deliver events to an injected sink
//!
//! # Design Decisions
//! - `EventSink::record` returns nothing: a sink can drop or fail to write an
//!   event without the request noticing
//! - Header collections are rendered as JSON objects; a repeated header name
//!   becomes an array of its values

use std::sync::Mutex;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Something worth recording about a proxied request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProxyEvent {
    /// Request as received from the caller.
    Inbound {
        request_id: Uuid,
        method: String,
        url: String,
        headers: Value,
        timestamp: DateTime<Utc>,
    },
    /// A configured header was present and not forwarded.
    HeaderRemoved {
        request_id: Uuid,
        name: String,
    },
    /// Request as sent upstream.
    Outbound {
        request_id: Uuid,
        method: String,
        url: String,
        headers: Value,
        timestamp: DateTime<Utc>,
    },
    /// Upstream response about to be relayed.
    Response {
        request_id: Uuid,
        status: u16,
        status_text: String,
        headers: Value,
        timestamp: DateTime<Utc>,
    },
    /// The pipeline failed and a 500 was returned instead.
    Failure {
        request_id: Uuid,
        kind: String,
        error: String,
    },
}

impl ProxyEvent {
    pub fn request_id(&self) -> Uuid {
        match self {
            ProxyEvent::Inbound { request_id, .. }
            | ProxyEvent::HeaderRemoved { request_id, .. }
            | ProxyEvent::Outbound { request_id, .. }
            | ProxyEvent::Response { request_id, .. }
            | ProxyEvent::Failure { request_id, .. } => *request_id,
        }
    }
}

/// Destination for proxy events.
pub trait EventSink: Send + Sync {
    /// Record one event. Must not block on I/O and must not panic.
    fn record(&self, event: ProxyEvent);
}

/// Emits every event through `tracing` with structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: ProxyEvent) {
        match event {
            ProxyEvent::Inbound { request_id, method, url, headers, timestamp } => {
                tracing::info!(
                    request_id = %request_id,
                    method = %method,
                    url = %url,
                    headers = %headers,
                    timestamp = %timestamp.to_rfc3339(),
                    "Incoming request"
                );
            }
            ProxyEvent::HeaderRemoved { request_id, name } => {
                tracing::info!(request_id = %request_id, header = %name, "Removed header");
            }
            ProxyEvent::Outbound { request_id, method, url, headers, timestamp } => {
                tracing::info!(
                    request_id = %request_id,
                    method = %method,
                    url = %url,
                    headers = %headers,
                    timestamp = %timestamp.to_rfc3339(),
                    "Forwarding request"
                );
            }
            ProxyEvent::Response { request_id, status, status_text, headers, timestamp } => {
                tracing::info!(
                    request_id = %request_id,
                    status,
                    status_text = %status_text,
                    headers = %headers,
                    timestamp = %timestamp.to_rfc3339(),
                    "Upstream response"
                );
            }
            ProxyEvent::Failure { request_id, kind, error } => {
                tracing::error!(request_id = %request_id, kind = %kind, error = %error, "Proxy error");
            }
        }
    }
}

/// Keeps events in memory. Used by tests and embedding code that wants to
/// inspect traffic.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ProxyEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<ProxyEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: ProxyEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Render a header collection as a JSON object.
pub fn headers_to_json(headers: &HeaderMap) -> Value {
    let mut map = Map::new();
    for name in headers.keys() {
        let mut values: Vec<Value> = headers
            .get_all(name)
            .iter()
            .map(|v| Value::String(String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let value = if values.len() == 1 {
            values.remove(0)
        } else {
            Value::Array(values)
        };
        map.insert(name.as_str().to_string(), value);
    }
    Value::Object(map)
}
