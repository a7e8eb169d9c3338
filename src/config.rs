use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::checker::DEFAULT_TIMEOUT_SECS;

/// Runtime configuration, read from an optional JSON file. Every field has
/// a default so an absent file runs the monitor with stock settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitorConfig {
    /// Address the API server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Seconds between polling sweeps.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Per-probe timeout in seconds.
    #[serde(default = "default_check_timeout")]
    pub check_timeout_secs: u64,
    /// Maximum in-flight probes during one sweep.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Sites checked once at startup and polled from then on.
    #[serde(default)]
    pub websites: Vec<String>,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_poll_interval() -> u64 {
    60
}

fn default_check_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_concurrency() -> usize {
    16
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            poll_interval_secs: default_poll_interval(),
            check_timeout_secs: default_check_timeout(),
            max_concurrency: default_max_concurrency(),
            websites: Vec::new(),
        }
    }
}

impl MonitorConfig {
    /// Loads config from `path`. A missing file yields the defaults; an
    /// unreadable or malformed file is a startup error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }
}
