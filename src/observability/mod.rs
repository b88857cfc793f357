//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handler produces:
//!     → events.rs (ProxyEvent → injected EventSink, TracingSink by default)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows through every event of a request
//! - Neither events nor metrics can fail a request

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{EventSink, MemorySink, ProxyEvent, TracingSink};
