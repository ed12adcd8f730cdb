//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Control plane initialize → Discovery connect
//!         → Reconciliation loop → Management listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Stop ticking → Cleanup → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: control plane first, listener last
//! - Any startup error is fatal; nothing after startup is
//! - Cleanup of discovered routes happens after the loop has stopped ticking

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{run, run_until, StartupError};
