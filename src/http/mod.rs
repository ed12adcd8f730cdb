//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (CORS, request ID, trace, timeout)
//!     → admin handlers (management API)
//!     → static assets (fallback, optional)
//!     → Send to client
//! ```

pub mod server;

pub use server::{AppState, ManagementServer};
