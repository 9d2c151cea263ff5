//! # Client Configuration
//!
//! Loaded from TOML; any field may be omitted.
//!
//! ```toml
//! url = "http://localhost:8800"
//! key_file = "/home/alice/.ledger/keys/alice.priv"
//! disable_client_validation = false
//! wait = true
//! wait_timeout_secs = 30
//! ```
//!
//! `LF_URL` and `LF_KEY_FILE` override the file.

use crate::errors::ClientError;
use crate::service::WaitPolicy;
use lf_01_signing::KeyPair;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Node endpoint.
    pub url: String,
    /// Signing key file; required for anything that submits.
    pub key_file: Option<PathBuf>,
    /// Skip the local `validate` run before submitting.
    pub disable_client_validation: bool,
    /// Wait for commit after each submission.
    pub wait: bool,
    /// Wait deadline. `None` waits until commit, rejection or cancel.
    pub wait_timeout_secs: Option<u64>,
    pub poll_interval_ms: u64,
    pub max_poll_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8800".to_string(),
            key_file: None,
            disable_client_validation: false,
            wait: false,
            wait_timeout_secs: None,
            poll_interval_ms: 100,
            max_poll_interval_ms: 2_000,
        }
    }
}

impl ClientConfig {
    pub fn parse(content: &str) -> Result<Self, ClientError> {
        toml::from_str(content).map_err(|e| ClientError::Configuration(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Apply `LF_URL` and `LF_KEY_FILE` from the process environment.
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("LF_URL") {
            self.url = url;
        }
        if let Some(key_file) = lookup("LF_KEY_FILE") {
            self.key_file = Some(PathBuf::from(key_file));
        }
        self
    }

    pub fn load_keypair(&self) -> Result<KeyPair, ClientError> {
        let path = self
            .key_file
            .as_deref()
            .ok_or_else(|| ClientError::Configuration("no key file configured".to_string()))?;
        Ok(KeyPair::load(path)?)
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_secs.map(Duration::from_secs)
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            max_poll_interval: Duration::from_millis(
                self.max_poll_interval_ms.max(self.poll_interval_ms.max(1)),
            ),
        }
    }
}
