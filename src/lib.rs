//! Route synchronization for a reverse-proxy control plane.
//!
//! Keeps a control plane's route table consistent with routes declared
//! through the management API and routes discovered from workload labels.

pub mod admin;
pub mod config;
pub mod control_plane;
pub mod discovery;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod reconcile;
pub mod routing;

pub use config::ManagerConfig;
pub use control_plane::ControlPlaneClient;
pub use discovery::LabelDiscovery;
pub use http::ManagementServer;
pub use lifecycle::Shutdown;
pub use reconcile::ReconcileLoop;
