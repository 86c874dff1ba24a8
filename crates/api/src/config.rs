use std::{fmt::Display, net::SocketAddr, str::FromStr, time::Duration};

use os_revoke_authn::{DEFAULT_STORE_TIMEOUT, FallbackPolicy};
use os_revoke_storage::RetentionPolicy;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid { key: &'static str, value: String, reason: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub retention: RetentionPolicy,
    /// Bound on every store call made while serving a request.
    pub store_timeout: Duration,
    pub fallback: FallbackPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            retention: RetentionPolicy::default(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
            fallback: FallbackPolicy::FailClosed,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset keys keep their default;
    /// set but malformed keys are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        if let Some(addr) = parse(&lookup, "BIND_ADDR", SocketAddr::from_str)? {
            cfg.bind_addr = addr;
        }

        if let Some(secs) = parse(&lookup, "REVOKE_MAX_TOKEN_LIFETIME_SECONDS", u64::from_str)? {
            cfg.retention.max_token_lifetime = Duration::from_secs(secs);
        }
        if let Some(secs) = parse(&lookup, "REVOKE_EXPIRATION_BUFFER_SECONDS", u64::from_str)? {
            cfg.retention.expiration_buffer = Duration::from_secs(secs);
        }
        if let Some(secs) = parse(&lookup, "REVOKE_PRUNE_INTERVAL_SECONDS", positive_secs)? {
            cfg.retention.prune_interval = secs;
        }
        if let Some(on_append) = parse(&lookup, "REVOKE_PRUNE_ON_APPEND", parse_bool)? {
            cfg.retention.prune_on_append = on_append;
        }
        if let Some(enabled) = parse(&lookup, "REVOKE_PRUNING_ENABLED", parse_bool)? {
            cfg.retention.enabled = enabled;
        }

        if let Some(ms) = parse(&lookup, "REVOKE_STORE_TIMEOUT_MS", u64::from_str)? {
            cfg.store_timeout = Duration::from_millis(ms);
        }
        if let Some(secs) = parse(&lookup, "REVOKE_FALLBACK_MAX_STALENESS_SECONDS", u64::from_str)? {
            cfg.fallback = FallbackPolicy::LastKnown { max_staleness: Duration::from_secs(secs) };
        }

        Ok(cfg)
    }
}

fn parse<T, E: Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    parser: impl Fn(&str) -> Result<T, E>,
) -> Result<Option<T>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    parser(raw.trim())
        .map(Some)
        .map_err(|e| ConfigError::Invalid { key, value: raw.clone(), reason: e.to_string() })
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected true or false".to_owned()),
    }
}

fn positive_secs(raw: &str) -> Result<Duration, String> {
    match u64::from_str(raw) {
        Ok(0) => Err("must be greater than zero".to_owned()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(e.to_string()),
    }
}
