//! # Node Configuration
//!
//! Plain structs with defaults, overridable from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `LF_HTTP_PORT` | `api.http_port` |
//! | `LF_LEGACY_APPLY` | `families.legacy_apply` |
//! | `LF_BLOCK_INTERVAL_MS` | `ordering.block_interval_ms` |
//!
//! Unparsable values are logged and ignored.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    pub api: ApiConfig,
    pub families: FamilyConfig,
    pub ordering: OrderingConfig,
    pub status: StatusConfig,
}

impl NodeConfig {
    /// Reject values the node cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ordering.block_interval_ms == 0 {
            return Err(ConfigError::invalid("ordering.block_interval_ms", "must be positive"));
        }
        if self.ordering.max_batch_size == 0 {
            return Err(ConfigError::invalid("ordering.max_batch_size", "must be positive"));
        }
        if self.families.enabled.is_empty() {
            return Err(ConfigError::invalid("families.enabled", "no families enabled"));
        }
        if self.status.retention == 0 {
            return Err(ConfigError::invalid("status.retention", "must be positive"));
        }
        Ok(())
    }

    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(port) = lookup("LF_HTTP_PORT") {
            match port.parse() {
                Ok(p) => self.api.http_port = p,
                Err(_) => warn!(value = %port, "LF_HTTP_PORT is not a port number"),
            }
        }
        if let Some(flag) = lookup("LF_LEGACY_APPLY") {
            match parse_flag(&flag) {
                Some(legacy) => {
                    self.families.legacy_apply = legacy;
                    if legacy {
                        info!("Legacy clinical apply enabled");
                    }
                }
                None => warn!(value = %flag, "LF_LEGACY_APPLY must be true/false"),
            }
        }
        if let Some(interval) = lookup("LF_BLOCK_INTERVAL_MS") {
            match interval.parse() {
                Ok(ms) => self.ordering.block_interval_ms = ms,
                Err(_) => warn!(value = %interval, "LF_BLOCK_INTERVAL_MS is not a number"),
            }
        }
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub enabled: bool,
    pub http_host: IpAddr,
    pub http_port: u16,
}

impl ApiConfig {
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http_host, self.http_port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            http_host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            http_port: 8800,
        }
    }
}

/// Which families to load.
#[derive(Debug, Clone)]
pub struct FamilyConfig {
    /// Family names, e.g. `clinical`, `arcade`.
    pub enabled: Vec<String>,
    /// Clinical apply writes names to themselves, as older deployments did.
    pub legacy_apply: bool,
}

impl Default for FamilyConfig {
    fn default() -> Self {
        Self {
            enabled: vec!["clinical".to_string(), "arcade".to_string()],
            legacy_apply: false,
        }
    }
}

/// Ordering loop configuration.
#[derive(Debug, Clone)]
pub struct OrderingConfig {
    pub block_interval_ms: u64,
    /// Most transactions ordered into one block.
    pub max_batch_size: usize,
}

impl OrderingConfig {
    pub fn block_interval(&self) -> Duration {
        Duration::from_millis(self.block_interval_ms)
    }
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            block_interval_ms: 200,
            max_batch_size: 100,
        }
    }
}

/// Submission status bookkeeping.
#[derive(Debug, Clone)]
pub struct StatusConfig {
    /// Final statuses kept before the oldest are forgotten.
    pub retention: usize,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self { retention: 10_000 }
    }
}
