//! Reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! Every tick:
//!     1. Discover  → LabelDiscovery::discover (if enabled)
//!     2. Converge  → existence probe, then ControlPlaneClient::add_route
//!     3. Refresh   → ControlPlaneClient::refresh (always)
//!
//! On shutdown:
//!     re-discover → delete each discovered route by derived id
//! ```
//!
//! # Design Decisions
//! - A stage failure is logged and counted, never fatal
//! - One task owns the ticker; a slow tick delays, never overlaps, the next
//! - Missed ticks are skipped rather than bursted

pub mod worker;

pub use worker::{ReconcileLoop, TickReport};
