//! Request transformation: upstream target resolution and header filtering.
//!
//! # Responsibilities
//! - Parse the configured upstream base once, at startup
//! - Retarget the inbound URI onto the upstream scheme and authority
//! - Drop configured header names from the forwarded header set
//!
//! # Design Decisions
//! - Path and query are copied verbatim; no normalization or re-encoding
//! - Header names are compared in their normalized (lowercase) form, which
//!   makes matching case-insensitive without per-request allocation
//! - Filtering walks the inbound headers in order and appends, so kept
//!   headers (including repeated names) stay in their original order

use std::str::FromStr;

use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{HeaderMap, HeaderName, Uri};

use crate::config::UpstreamConfig;
use crate::error::{ConfigurationError, ProxyError};

/// Scheme and authority of the upstream service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamBase {
    scheme: Scheme,
    authority: Authority,
}

impl UpstreamBase {
    /// Parse an absolute `http` or `https` URL.
    ///
    /// Any path, query or fragment on the base is accepted but ignored: the
    /// inbound path always replaces it.
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let url = url::Url::parse(raw.trim()).map_err(|_| ConfigurationError::InvalidTargetDomain)?;

        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            _ => return Err(ConfigurationError::InvalidTargetDomain),
        };

        let host = url.host_str().ok_or(ConfigurationError::InvalidTargetDomain)?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority =
            Authority::from_str(&authority).map_err(|_| ConfigurationError::InvalidTargetDomain)?;

        Ok(Self { scheme, authority })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

impl std::fmt::Display for UpstreamBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

/// Set of request header names that are never forwarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovedHeaders {
    names: Vec<HeaderName>,
}

impl RemovedHeaders {
    /// Build from configured names. Blank and unparseable names are skipped;
    /// neither can match a real header.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: Vec<HeaderName> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            match HeaderName::from_bytes(name.to_ascii_lowercase().as_bytes()) {
                Ok(name) if !set.contains(&name) => set.push(name),
                Ok(_) => {}
                Err(_) => tracing::warn!(header = %name, "Ignoring invalid header name in removal list"),
            }
        }
        Self { names: set }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn contains(&self, name: &HeaderName) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderName> {
        self.names.iter()
    }
}

/// Immutable per-deployment settings consumed by the handler.
#[derive(Debug, Clone)]
pub struct ForwardingConfig {
    upstream: Result<UpstreamBase, ConfigurationError>,
    removed_headers: RemovedHeaders,
}

impl ForwardingConfig {
    pub fn new(
        upstream: Result<UpstreamBase, ConfigurationError>,
        removed_headers: RemovedHeaders,
    ) -> Self {
        Self {
            upstream,
            removed_headers,
        }
    }

    /// Build from the loaded configuration. A missing or malformed
    /// `target_domain` is kept as an error and reported on every request.
    pub fn from_config(config: &UpstreamConfig) -> Self {
        let upstream = match config.target_domain.as_deref() {
            Some(raw) if !raw.trim().is_empty() => UpstreamBase::parse(raw),
            _ => Err(ConfigurationError::MissingTargetDomain),
        };
        Self::new(upstream, RemovedHeaders::from_names(&config.remove_headers))
    }

    pub fn upstream(&self) -> Result<&UpstreamBase, ConfigurationError> {
        self.upstream.as_ref().map_err(|e| e.clone())
    }

    pub fn removed_headers(&self) -> &RemovedHeaders {
        &self.removed_headers
    }
}

/// Combine the upstream scheme and authority with the inbound path and query.
pub fn resolve_target(base: &UpstreamBase, inbound: &Uri) -> Result<Uri, ProxyError> {
    let path_and_query = inbound
        .path_and_query()
        .cloned()
        .unwrap_or_else(|| PathAndQuery::from_static("/"));

    Uri::builder()
        .scheme(base.scheme.clone())
        .authority(base.authority.clone())
        .path_and_query(path_and_query)
        .build()
        .map_err(ProxyError::from)
}

/// Result of filtering a header collection.
#[derive(Debug, Default)]
pub struct FilteredHeaders {
    /// Headers to forward, in inbound order.
    pub headers: HeaderMap,
    /// Configured names that were present and dropped, each listed once.
    pub removed: Vec<HeaderName>,
}

/// Copy every header whose name is not in `removed`, preserving order and
/// repeated values.
pub fn filter_headers(inbound: &HeaderMap, removed: &RemovedHeaders) -> FilteredHeaders {
    let mut out = FilteredHeaders {
        headers: HeaderMap::with_capacity(inbound.len()),
        removed: Vec::new(),
    };

    for (name, value) in inbound.iter() {
        if removed.contains(name) {
            if !out.removed.contains(name) {
                out.removed.push(name.clone());
            }
            continue;
        }
        out.headers.append(name.clone(), value.clone());
    }

    out
}
