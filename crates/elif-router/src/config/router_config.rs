//! Router configuration
//!
//! Values come from `Default`, from `ROUTER_*` environment variables or
//! from any serde source, and must pass [`RouterConfig::validate`] before
//! the registry is built.

use super::defaults::RouterDefaults;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Router and dispatcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Let wildcard captures contain `..` components
    pub allow_path_traversal: bool,
    /// Serve HEAD requests from the GET route when no HEAD route exists
    pub head_fallback_to_get: bool,
    /// Longer paths are reported as not found without a trie walk
    pub max_path_segments: usize,
    /// Request body limit applied by the axum bridge
    pub max_body_bytes: usize,
    /// Requests slower than this are logged at warn
    pub slow_request_threshold_ms: u64,
    /// Per-request deadline applied by the axum bridge, zero for none
    pub request_timeout_secs: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            allow_path_traversal: RouterDefaults::ALLOW_PATH_TRAVERSAL,
            head_fallback_to_get: RouterDefaults::HEAD_FALLBACK_TO_GET,
            max_path_segments: RouterDefaults::MAX_PATH_SEGMENTS,
            max_body_bytes: RouterDefaults::MAX_BODY_BYTES,
            slow_request_threshold_ms: RouterDefaults::SLOW_REQUEST_THRESHOLD_MS,
            request_timeout_secs: RouterDefaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl RouterConfig {
    /// Load configuration from `ROUTER_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            allow_path_traversal: env_or_default(
                "ROUTER_ALLOW_PATH_TRAVERSAL",
                "allow_path_traversal",
                RouterDefaults::ALLOW_PATH_TRAVERSAL,
                "true or false",
            )?,
            head_fallback_to_get: env_or_default(
                "ROUTER_HEAD_FALLBACK_TO_GET",
                "head_fallback_to_get",
                RouterDefaults::HEAD_FALLBACK_TO_GET,
                "true or false",
            )?,
            max_path_segments: env_or_default(
                "ROUTER_MAX_PATH_SEGMENTS",
                "max_path_segments",
                RouterDefaults::MAX_PATH_SEGMENTS,
                "positive number of segments",
            )?,
            max_body_bytes: env_or_default(
                "ROUTER_MAX_BODY_BYTES",
                "max_body_bytes",
                RouterDefaults::MAX_BODY_BYTES,
                "valid number of bytes",
            )?,
            slow_request_threshold_ms: env_or_default(
                "ROUTER_SLOW_REQUEST_THRESHOLD_MS",
                "slow_request_threshold_ms",
                RouterDefaults::SLOW_REQUEST_THRESHOLD_MS,
                "valid number of milliseconds",
            )?,
            request_timeout_secs: env_or_default(
                "ROUTER_REQUEST_TIMEOUT",
                "request_timeout_secs",
                RouterDefaults::REQUEST_TIMEOUT_SECS,
                "valid number of seconds",
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_path_segments == 0 {
            return Err(ConfigError::validation_failed(
                "Maximum path segments must be greater than 0",
            ));
        }

        if self.max_body_bytes == 0 {
            return Err(ConfigError::validation_failed(
                "Maximum body size must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Get the request deadline, if any
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

fn env_or_default<T>(key: &str, field: &str, default: T, expected: &str) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match env::var(key) {
        Ok(value) => value.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
            field: field.to_string(),
            value,
            expected: expected.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
