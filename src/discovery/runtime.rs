//! Container engine access.
//!
//! # Responsibilities
//! - Connect to a Docker-compatible engine (Docker, Podman's compat socket)
//! - List running containers as runtime-neutral `Workload`s

use std::collections::HashMap;

use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::models::ContainerSummary;
use bollard::Docker;

use crate::discovery::{DiscoveryError, DiscoveryResult};

/// Engine request timeout in seconds.
const ENGINE_TIMEOUT_SECS: u64 = 30;

/// A running workload as reported by the runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workload {
    /// Primary name, without the engine's leading `/`.
    pub name: Option<String>,
    pub labels: HashMap<String, String>,
    /// Host-side published ports, in the order the engine reports them.
    pub published_ports: Vec<u16>,
}

impl From<ContainerSummary> for Workload {
    fn from(summary: ContainerSummary) -> Self {
        let name = summary
            .names
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|n| n.trim_start_matches('/').to_string());

        let published_ports = summary
            .ports
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.public_port)
            .collect();

        Self {
            name,
            labels: summary.labels.unwrap_or_default(),
            published_ports,
        }
    }
}

/// Anything that can enumerate running workloads.
#[async_trait]
pub trait WorkloadSource: Send + Sync {
    async fn list_workloads(&self) -> DiscoveryResult<Vec<Workload>>;
}

/// Docker-API client for container discovery.
pub struct ContainerRuntime {
    client: Docker,
    endpoint: String,
}

impl ContainerRuntime {
    /// Connect to `unix:///path/to.sock` or `tcp://host:port` and verify with a ping.
    pub async fn connect(endpoint: &str) -> DiscoveryResult<Self> {
        let client = Self::connect_to_host(endpoint)?;

        client.ping().await.map_err(|e| {
            DiscoveryError::Unavailable(format!("engine at '{}' is not responding: {}", endpoint, e))
        })?;

        tracing::info!(endpoint = %endpoint, "Connected to container engine");
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn connect_to_host(endpoint: &str) -> DiscoveryResult<Docker> {
        if let Some(socket_path) = endpoint.strip_prefix("unix://") {
            Docker::connect_with_socket(socket_path, ENGINE_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
                .map_err(|e| {
                    DiscoveryError::Unavailable(format!("cannot connect to socket '{}': {}", socket_path, e))
                })
        } else if endpoint.starts_with("tcp://") || endpoint.starts_with("http://") {
            Docker::connect_with_http(endpoint, ENGINE_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
                .map_err(|e| {
                    DiscoveryError::Unavailable(format!("cannot connect to '{}': {}", endpoint, e))
                })
        } else {
            Err(DiscoveryError::Unavailable(format!(
                "invalid engine endpoint '{}': expected 'unix:///path/to/socket' or 'tcp://host:port'",
                endpoint
            )))
        }
    }
}

#[async_trait]
impl WorkloadSource for ContainerRuntime {
    async fn list_workloads(&self) -> DiscoveryResult<Vec<Workload>> {
        let options = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };

        let containers = self.client.list_containers(Some(options)).await.map_err(|e| {
            DiscoveryError::Unavailable(format!("listing containers at '{}' failed: {}", self.endpoint, e))
        })?;

        Ok(containers.into_iter().map(Workload::from).collect())
    }
}
