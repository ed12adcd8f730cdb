//! The periodic discover → converge → refresh loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::ReconcileConfig;
use crate::control_plane::ControlPlaneClient;
use crate::discovery::LabelDiscovery;
use crate::observability::metrics;

/// Outcome of one reconciliation tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Intents returned by discovery.
    pub discovered: usize,
    /// Routes created this tick.
    pub added: usize,
    /// Intents whose route already existed.
    pub existing: usize,
    /// Creates that failed for a reason other than already existing.
    pub failed: usize,
    pub discovery_failed: bool,
    pub refresh_failed: bool,
}

/// Keeps the control plane converged with discovered workloads.
pub struct ReconcileLoop {
    client: Arc<ControlPlaneClient>,
    discovery: Option<LabelDiscovery>,
    interval: Duration,
    cleanup_on_shutdown: bool,
}

impl ReconcileLoop {
    pub fn new(
        client: Arc<ControlPlaneClient>,
        discovery: Option<LabelDiscovery>,
        config: &ReconcileConfig,
    ) -> Self {
        Self {
            client,
            discovery,
            interval: Duration::from_secs(config.interval_secs),
            cleanup_on_shutdown: config.cleanup_on_shutdown,
        }
    }

    /// Tick until shutdown, then run the cleanup pass if configured.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            discovery = self.discovery.is_some(),
            "Reconciliation loop starting"
        );

        // The mirror was loaded during initialization; first tick after one period.
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Reconciliation loop received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        if self.cleanup_on_shutdown {
            self.cleanup().await;
        }
    }

    /// Run one discover → converge → refresh cycle.
    pub async fn tick(&self) -> TickReport {
        metrics::record_reconcile_tick();
        let mut report = TickReport::default();

        if let Some(discovery) = &self.discovery {
            match discovery.discover().await {
                Ok(intents) => {
                    report.discovered = intents.len();
                    for intent in intents {
                        let rule = intent.to_routing_rule();
                        if self.client.route_exists(&rule.id).await {
                            report.existing += 1;
                            continue;
                        }

                        match self.client.add_route(rule).await {
                            Ok(()) => {
                                tracing::info!(host = %intent.host_match, upstream = %intent.upstream, "Added workload route");
                                metrics::record_route_added("discovery");
                                report.added += 1;
                            }
                            Err(e) if e.is_already_exists() => {
                                report.existing += 1;
                            }
                            Err(e) => {
                                tracing::error!(host = %intent.host_match, error = %e, "Failed to add workload route");
                                metrics::record_stage_failure("converge");
                                report.failed += 1;
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to discover workload proxies");
                    metrics::record_stage_failure("discover");
                    report.discovery_failed = true;
                }
            }
        }

        if let Err(e) = self.client.refresh().await {
            tracing::error!(error = %e, "Failed to refresh control plane routes");
            metrics::record_stage_failure("refresh");
            report.refresh_failed = true;
        }

        tracing::debug!(?report, "Reconciliation tick complete");
        report
    }

    /// Best-effort removal of every currently discovered route.
    ///
    /// Returns the number of routes deleted. Failures are logged only.
    pub async fn cleanup(&self) -> usize {
        let Some(discovery) = &self.discovery else {
            return 0;
        };

        let intents = match discovery.discover().await {
            Ok(intents) => intents,
            Err(e) => {
                tracing::error!(error = %e, "Failed to discover workload proxies for cleanup");
                return 0;
            }
        };

        let mut deleted = 0;
        for intent in intents {
            let id = intent.to_routing_rule().id;
            match self.client.delete_route(&id).await {
                Ok(()) => {
                    metrics::record_route_deleted("cleanup");
                    deleted += 1;
                }
                Err(e) => {
                    tracing::error!(route_id = %id, host = %intent.host_match, error = %e, "Failed to delete workload route");
                }
            }
        }

        tracing::info!(deleted, "Workload route cleanup complete");
        deleted
    }
}
