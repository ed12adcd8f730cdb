//! Route model subsystem.
//!
//! # Data Flow
//! ```text
//! Management request / workload labels
//!     → model.rs (ProxyIntent: host match → upstream)
//!     → id.rs (identity derived from the host match alone)
//!     → model.rs (RoutingRule: control-plane wire shape)
//!     → control_plane client
//! ```
//!
//! # Design Decisions
//! - Identity never depends on the upstream, so re-pointing a host keeps its id
//! - Projections are pure: no I/O, no failure mode
//! - Wire types mirror the control plane's JSON exactly (`@id`, `handle`, `match`)

pub mod id;
pub mod model;

pub use id::derive_id;
pub use model::{Handle, HostMatch, ProxyIntent, RoutingRule, ServerRoutes, Upstream, REVERSE_PROXY_HANDLER};
