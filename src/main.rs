//! Proxy Manager
//!
//! Keeps a reverse-proxy control plane's route table in sync with routes
//! declared over a management API and routes discovered from container labels.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────────┐
//!                 │                      PROXY MANAGER                        │
//!                 │                                                           │
//!   Management    │  ┌──────────┐    ┌───────────┐                            │
//!   requests  ────┼─▶│   http   │───▶│   admin   │──────┐                     │
//!                 │  │  server  │    │ handlers  │      │                     │
//!                 │  └──────────┘    └───────────┘      ▼                     │
//!                 │                              ┌───────────────┐            │     Control
//!                 │                              │ control_plane │◀──refresh──┼──── plane
//!                 │                              │ client+mirror │───create──▶┼──── admin API
//!                 │                              └───────────────┘            │
//!                 │                                     ▲                     │
//!                 │  ┌───────────┐    ┌───────────┐     │                     │
//!   Container ────┼─▶│ discovery │───▶│ reconcile │─────┘                     │
//!   engine        │  │  labels   │    │   loop    │                           │
//!                 │  └───────────┘    └───────────┘                           │
//!                 │                                                           │
//!                 │  config · lifecycle · observability                       │
//!                 └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use proxy_manager::config::{read_config, validate_config, ManagerConfig};
use proxy_manager::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "proxy-manager")]
#[command(about = "Synchronizes reverse-proxy routes from an API and container labels", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    address: Option<String>,

    /// API key required on mutating requests
    #[arg(long)]
    key: Option<String>,

    /// Discover routes from container labels
    #[arg(long, alias = "podman")]
    discovery: bool,

    /// Container engine socket
    #[arg(long)]
    socket: Option<String>,

    /// Base domain for discovered workloads
    #[arg(long)]
    domain: Option<String>,

    /// Control-plane admin API base URL
    #[arg(long)]
    control_plane: Option<String>,

    /// Control-plane server to manage
    #[arg(long)]
    server_name: Option<String>,

    /// Seconds between reconciliation ticks
    #[arg(long)]
    interval: Option<u64>,
}

impl Cli {
    fn apply(self, config: &mut ManagerConfig) {
        if let Some(address) = self.address {
            config.listener.bind_address = address;
        }
        if let Some(key) = self.key {
            config.admin.api_key = key;
        }
        if self.discovery {
            config.discovery.enabled = true;
        }
        if let Some(socket) = self.socket {
            config.discovery.socket = socket;
        }
        if let Some(domain) = self.domain {
            config.discovery.domain = domain;
        }
        if let Some(url) = self.control_plane {
            config.control_plane.base_url = url;
        }
        if let Some(name) = self.server_name {
            config.control_plane.server_name = name;
        }
        if let Some(interval) = self.interval {
            config.reconcile.interval_secs = interval;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();

    let mut config = match cli.config.take() {
        Some(path) => read_config(&path)?,
        None => ManagerConfig::default(),
    };
    cli.apply(&mut config);

    init_logging(&config.observability);
    tracing::info!("proxy-manager v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(field = error.field, "{}", error.message);
        }
        return Err(format!("invalid configuration ({} errors)", errors.len()).into());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        control_plane = %config.control_plane.base_url,
        server = %config.control_plane.server_name,
        discovery = config.discovery.enabled,
        interval_secs = config.reconcile.interval_secs,
        "Configuration loaded"
    );

    proxy_manager::lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
