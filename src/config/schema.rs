//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the manager.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy manager.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ManagerConfig {
    /// Management listener (bind address, static assets).
    pub listener: ListenerConfig,

    /// Management API authentication.
    pub admin: AdminConfig,

    /// Remote control-plane API.
    pub control_plane: ControlPlaneConfig,

    /// Workload label discovery.
    pub discovery: DiscoveryConfig,

    /// Reconciliation loop settings.
    pub reconcile: ReconcileConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Directory of frontend assets served at `/`, if any.
    pub static_dir: Option<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            static_dir: None,
            request_timeout_secs: 30,
        }
    }
}

/// Management API authentication.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared secret required on mutating requests.
    pub api_key: String,

    /// Header carrying the shared secret.
    pub key_header: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_key: "secret".to_string(),
            key_header: "X-Key".to_string(),
        }
    }
}

/// Control-plane API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlPlaneConfig {
    /// Base URL of the control-plane admin API.
    pub base_url: String,

    /// Name of the HTTP server whose routes are managed.
    pub server_name: String,

    /// Timeout for each control-plane request in seconds.
    pub request_timeout_secs: u64,

    /// Listen addresses used when the server has to be bootstrapped.
    pub default_listen: Vec<String>,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:2019".to_string(),
            server_name: "srv0".to_string(),
            request_timeout_secs: 10,
            default_listen: vec![":443".to_string()],
        }
    }
}

/// Workload discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Enable label-based discovery.
    pub enabled: bool,

    /// Container engine endpoint (`unix://...` or `tcp://...`).
    pub socket: String,

    /// Base domain appended to workload names.
    pub domain: String,

    /// Label namespace, e.g. `proxy-manager` for `proxy-manager.enable`.
    pub label_prefix: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            socket: "unix:///run/user/1000/podman/podman.sock".to_string(),
            domain: "example.com".to_string(),
            label_prefix: "proxy-manager".to_string(),
        }
    }
}

/// Reconciliation loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Seconds between ticks.
    pub interval_secs: u64,

    /// Remove discovered routes when the process exits.
    pub cleanup_on_shutdown: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            cleanup_on_shutdown: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log level when `RUST_LOG` is unset.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Metrics listener address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
