//! Error taxonomy for the forwarding pipeline.
//!
//! # Design Decisions
//! - Every failure inside the handler is a `ProxyError`; nothing escapes the
//!   handler boundary as a panic or unhandled fault
//! - Only `Configuration` errors carry a caller-visible message; upstream and
//!   transform failures collapse to a generic 500 (see `http::response`)

use thiserror::Error;

/// Result type alias for proxy operations.
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Missing or unusable upstream setting.
///
/// The `Display` text is sent verbatim to callers, so it names only the
/// configuration key and never the configured value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("TARGET_DOMAIN environment variable is required")]
    MissingTargetDomain,

    #[error("TARGET_DOMAIN environment variable is not a valid absolute http(s) URL")]
    InvalidTargetDomain,
}

/// Errors raised while handling one proxied request.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Required setting missing or invalid; detected before any network activity.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Network failure, refused connection or malformed upstream response.
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// The outbound request could not be constructed.
    #[error("Failed to build outbound request: {0}")]
    Transform(String),
}

impl ProxyError {
    /// Short label used in metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Configuration(_) => "configuration",
            ProxyError::Upstream(_) => "upstream",
            ProxyError::Transform(_) => "transform",
        }
    }
}

impl From<hyper_util::client::legacy::Error> for ProxyError {
    fn from(e: hyper_util::client::legacy::Error) -> Self {
        if e.is_connect() {
            ProxyError::Upstream(format!("connect: {}", e))
        } else {
            ProxyError::Upstream(e.to_string())
        }
    }
}

impl From<axum::http::Error> for ProxyError {
    fn from(e: axum::http::Error) -> Self {
        ProxyError::Transform(e.to_string())
    }
}
