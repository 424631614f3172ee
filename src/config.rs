//! Configuration types for hostnet-dns.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::annotations::Compatibility;
use crate::error::SourceError;

/// Upper bound on `sync_timeout_secs` (one day).
pub const MAX_SYNC_TIMEOUT_SECS: u64 = 86_400;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Endpoint source configuration.
    #[serde(default)]
    pub source: SourceConfig,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Endpoint source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Namespace to list workloads from. Empty means all namespaces.
    #[serde(default)]
    pub namespace: String,

    /// Compatibility mode (`"kops-dns-controller"` enables the legacy
    /// annotations, anything else disables them).
    #[serde(default)]
    pub compatibility: Compatibility,

    /// How long to wait for the initial cache sync, in seconds.
    #[serde(default = "default_sync_timeout_secs")]
    pub sync_timeout_secs: u64,
}

impl SourceConfig {
    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.sync_timeout_secs == 0 {
            return Err(SourceError::Config(
                "sync_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.sync_timeout_secs > MAX_SYNC_TIMEOUT_SECS {
            return Err(SourceError::Config(format!(
                "sync_timeout_secs must be at most {MAX_SYNC_TIMEOUT_SECS}, got {}",
                self.sync_timeout_secs
            )));
        }
        Ok(())
    }

    /// Initial sync timeout as a duration.
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.sync_timeout_secs)
    }

    /// Namespace scope, `None` for all namespaces.
    pub fn namespace_scope(&self) -> Option<&str> {
        if self.namespace.is_empty() {
            None
        } else {
            Some(self.namespace.as_str())
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            compatibility: Compatibility::None,
            sync_timeout_secs: default_sync_timeout_secs(),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "debug", "hostnet_dns=debug,warn").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prometheus metrics exporter address.
    #[serde(default)]
    pub prometheus_addr: Option<SocketAddr>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            prometheus_addr: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sync_timeout_secs() -> u64 {
    60
}
