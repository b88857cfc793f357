//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (TARGET_DOMAIN, REMOVE_HEADERS, BIND_ADDRESS)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → ForwardingConfig (parsed upstream + removal set)
//!     → shared via Arc with the request handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ProxyConfig;
pub use schema::ListenerConfig;
pub use schema::UpstreamConfig;
pub use schema::ClientConfig;
pub use schema::ObservabilityConfig;
pub use schema::LogFormat;
