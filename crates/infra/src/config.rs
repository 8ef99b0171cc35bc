//! Configuration loading and representation.
//!
//! Everything is read from environment variables once at startup. Loaders take
//! a lookup function so tests can feed values without touching the process
//! environment.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is not a valid number: {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Connection settings for the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Sent as the `saas-namespace` header on every call.
    pub namespace_id: String,
    /// Upper bound on in-flight catalog calls (and pooled idle connections).
    pub max_connections: usize,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    /// Ceiling on one call, from send to fully-read response.
    ///
    /// This bounds a single request, not how long a pooled connection may
    /// live: reqwest has no connection max-lifetime setting, so connections
    /// are only retired by `idle_timeout`.
    pub request_timeout: Duration,
    /// How long a call may wait for a free connection slot.
    pub acquire_timeout: Duration,
}

impl CatalogConfig {
    pub fn new(base_url: impl Into<String>, namespace_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            namespace_id: namespace_id.into(),
            max_connections: 500,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(20),
            request_timeout: Duration::from_secs(60),
            acquire_timeout: Duration::from_secs(60),
        }
    }

    /// `Ok(None)` when `CMS_BASE_URL` is unset (no remote catalog configured).
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(base_url) = non_blank(lookup("CMS_BASE_URL")) else {
            return Ok(None);
        };
        let namespace_id =
            non_blank(lookup("CMS_NAMESPACE_ID")).ok_or(ConfigError::Missing("CMS_NAMESPACE_ID"))?;

        let defaults = Self::new(base_url, namespace_id);
        Ok(Some(Self {
            max_connections: number(&lookup, "CMS_MAX_CONNECTIONS", defaults.max_connections)?,
            connect_timeout: seconds(&lookup, "CMS_CONNECT_TIMEOUT_SECS", defaults.connect_timeout)?,
            idle_timeout: seconds(&lookup, "CMS_IDLE_TIMEOUT_SECS", defaults.idle_timeout)?,
            request_timeout: seconds(&lookup, "CMS_REQUEST_TIMEOUT_SECS", defaults.request_timeout)?,
            acquire_timeout: seconds(&lookup, "CMS_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout)?,
            ..defaults
        }))
    }
}

/// Where SKU creation events go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsConfig {
    /// Redis connection URL; `None` keeps events in-process.
    pub redis_url: Option<String>,
    pub creation_topic: String,
}

impl EventsConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            redis_url: non_blank(lookup("SKU_EVENTS_REDIS_URL")),
            creation_topic: non_blank(lookup("SKU_CREATION_TOPIC"))
                .unwrap_or_else(|| "sku-creation".to_string()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn number<F>(lookup: &F, key: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match non_blank(lookup(key)) {
        None => Ok(default),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidNumber { key, value: raw }),
        },
    }
}

fn seconds<F>(lookup: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = number(lookup, key, default.as_secs() as usize)?;
    Ok(Duration::from_secs(secs as u64))
}
