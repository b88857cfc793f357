//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, every path and method)
//!     → handler.rs (forwarding pipeline)
//!         → request.rs (target resolution, header filtering)
//!         → upstream.rs (pooled HTTP/HTTPS client)
//!         → response.rs (relay, error responses)
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;
pub mod upstream;

pub use handler::Forwarder;
pub use request::{ForwardingConfig, RemovedHeaders, UpstreamBase};
pub use server::{build_router, HttpServer};
pub use upstream::{HttpsUpstream, Upstream};
