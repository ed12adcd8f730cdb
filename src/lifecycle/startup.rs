//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize the control-plane client (fatal on failure)
//! - Connect discovery when enabled (fatal on failure)
//! - Start the reconciliation loop and the management listener
//! - Wait for shutdown, then let the loop finish its cleanup pass

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ManagerConfig;
use crate::control_plane::{ControlPlaneClient, ControlPlaneError};
use crate::discovery::{DiscoveryError, LabelDiscovery};
use crate::http::{AppState, ManagementServer};
use crate::lifecycle::signals::spawn_signal_listener;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::reconcile::ReconcileLoop;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialize control plane client: {0}")]
    ControlPlane(#[from] ControlPlaneError),

    #[error("failed to initialize workload discovery: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("failed to bind management listener on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("management server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the manager until SIGINT/SIGTERM.
pub async fn run(config: ManagerConfig) -> Result<(), StartupError> {
    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());
    run_until(config, shutdown).await
}

/// Run the manager until `shutdown` is triggered.
pub async fn run_until(config: ManagerConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let client = Arc::new(ControlPlaneClient::new(&config.control_plane)?);
    client.initialize().await?;

    let discovery = if config.discovery.enabled {
        Some(LabelDiscovery::connect(&config.discovery).await?)
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let reconcile = ReconcileLoop::new(client.clone(), discovery.clone(), &config.reconcile);
    let reconcile_handle = tokio::spawn(reconcile.run(shutdown.subscribe()));

    let state = AppState {
        client,
        discovery,
        admin: Arc::new(config.admin.clone()),
    };
    let server = ManagementServer::new(state, &config.listener);
    let served = server.run(listener, shutdown.clone()).await;

    // A listener failure also stops the loop so cleanup still runs.
    shutdown.trigger();
    if let Err(e) = reconcile_handle.await {
        tracing::error!(error = %e, "Reconciliation task panicked");
    }

    served.map_err(StartupError::Serve)
}
