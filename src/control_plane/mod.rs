//! Control-plane subsystem.
//!
//! # Data Flow
//! ```text
//! Management handlers / reconciliation loop
//!     → client.rs (idempotent add, delete, refresh)
//!     → remote control-plane admin API (HTTP + JSON)
//!
//! Remote server route table
//!     → client.rs refresh (wholesale replace)
//!     → mirror (read by list_proxies, never written from outside)
//! ```
//!
//! # Design Decisions
//! - The client is the only component that talks to the control plane
//! - Remote write success gates every local mirror mutation
//! - Deletes never touch the mirror; the next refresh converges it
//! - No retries here: the reconciliation interval is the retry policy

pub mod client;
pub mod error;

pub use client::{base_config, ControlPlaneClient};
pub use error::{ControlPlaneError, ControlPlaneResult};
