//! Stateless HTTP forwarding proxy library.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use error::{ConfigurationError, ProxyError};
pub use http::{Forwarder, HttpServer};
pub use lifecycle::Shutdown;
