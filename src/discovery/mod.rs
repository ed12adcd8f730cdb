//! Workload discovery subsystem.
//!
//! # Data Flow
//! ```text
//! Container engine (Docker / Podman compatible API)
//!     → runtime.rs (list running workloads: name, labels, published ports)
//!     → labels.rs (filter on `<prefix>.enable`, derive host + upstream)
//!     → Vec<ProxyIntent>
//!     → reconciliation loop / `GET /container-proxies`
//! ```
//!
//! # Design Decisions
//! - Read-only: discovery never writes to the control plane
//! - One malformed workload is skipped with a warning, never fatal
//! - Upstreams dial `localhost`: the manager runs beside the published ports

pub mod labels;
pub mod runtime;

use std::sync::Arc;

use thiserror::Error;

use crate::config::DiscoveryConfig;
use crate::observability::metrics;
use crate::routing::ProxyIntent;

pub use labels::{project_workload, LabelKeys};
pub use runtime::{ContainerRuntime, Workload, WorkloadSource};

/// Errors raised while discovering workloads.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The workload runtime could not be reached or answered with an error.
    #[error("workload runtime unavailable: {0}")]
    Unavailable(String),
}

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Projects labelled workloads into proxy intents.
#[derive(Clone)]
pub struct LabelDiscovery {
    source: Arc<dyn WorkloadSource>,
    keys: LabelKeys,
    domain: String,
}

impl LabelDiscovery {
    /// Build an adapter over an arbitrary workload source.
    pub fn new(source: Arc<dyn WorkloadSource>, config: &DiscoveryConfig) -> Self {
        Self {
            source,
            keys: LabelKeys::new(&config.label_prefix),
            domain: config.domain.clone(),
        }
    }

    /// Connect to the configured container engine and build an adapter over it.
    pub async fn connect(config: &DiscoveryConfig) -> DiscoveryResult<Self> {
        let runtime = ContainerRuntime::connect(&config.socket).await?;
        Ok(Self::new(Arc::new(runtime), config))
    }

    /// List running workloads and project the opted-in ones.
    pub async fn discover(&self) -> DiscoveryResult<Vec<ProxyIntent>> {
        let workloads = self.source.list_workloads().await?;

        let intents: Vec<ProxyIntent> = workloads
            .iter()
            .filter_map(|w| project_workload(w, &self.keys, &self.domain))
            .collect();

        tracing::debug!(
            workloads = workloads.len(),
            proxies = intents.len(),
            "Workload discovery complete"
        );
        metrics::set_discovered_workloads(intents.len());
        Ok(intents)
    }
}

impl std::fmt::Debug for LabelDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelDiscovery")
            .field("keys", &self.keys)
            .field("domain", &self.domain)
            .finish()
    }
}
