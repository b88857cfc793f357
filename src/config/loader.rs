//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Upstream base URL.
pub const ENV_TARGET_DOMAIN: &str = "TARGET_DOMAIN";
/// Comma-separated request header names to strip.
pub const ENV_REMOVE_HEADERS: &str = "REMOVE_HEADERS";
/// Listener bind address.
pub const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";

/// Why the proxy could not assemble a configuration at startup.
///
/// A missing `TARGET_DOMAIN` is not one of these: it is reported per request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config file {} is not valid TOML: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Load configuration: optional TOML file, then environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        }
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables on top of file values.
///
/// An empty `TARGET_DOMAIN` counts as unset.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(target) = lookup(ENV_TARGET_DOMAIN) {
        let target = target.trim();
        config.upstream.target_domain = if target.is_empty() {
            None
        } else {
            Some(target.to_string())
        };
    }

    if let Some(list) = lookup(ENV_REMOVE_HEADERS) {
        config.upstream.remove_headers = parse_header_list(&list);
    }

    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr.trim().to_string();
    }
}

/// Split a comma-separated header list, trimming whitespace and dropping empty entries.
pub fn parse_header_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}
