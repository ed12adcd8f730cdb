//! Control-plane error definitions.

use thiserror::Error;

/// Errors returned by the control-plane client.
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    /// The control plane could not be reached (connect, timeout, I/O).
    #[error("control plane unreachable ({method} {url}): {source}")]
    Transport {
        method: reqwest::Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The control plane answered with a non-success status.
    #[error("control plane returned {status} for {method} {url}: {body}")]
    RemoteStatus {
        method: reqwest::Method,
        url: String,
        status: u16,
        body: String,
    },

    /// A payload from the control plane could not be decoded.
    #[error("corrupt control plane config at {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A route with this id is already present remotely.
    #[error("route already exists: {0}")]
    RouteAlreadyExists(String),

    /// The configured base URL or HTTP client is unusable.
    #[error("invalid control plane client configuration: {0}")]
    InvalidConfig(String),
}

impl ControlPlaneError {
    /// True for the idempotency guard, which callers treat as steady state.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ControlPlaneError::RouteAlreadyExists(_))
    }
}

/// Result type for control-plane operations.
pub type ControlPlaneResult<T> = Result<T, ControlPlaneError>;
