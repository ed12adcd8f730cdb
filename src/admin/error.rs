//! JSON error envelope for the management API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::control_plane::ControlPlaneError;
use crate::discovery::DiscoveryError;

/// Errors surfaced by management handlers as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API key")]
    Unauthorized,

    #[error("Invalid request body")]
    InvalidBody,

    #[error("Invalid proxy id")]
    InvalidId,

    #[error("Discovery not enabled")]
    DiscoveryDisabled,

    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidBody | ApiError::InvalidId => StatusCode::BAD_REQUEST,
            ApiError::DiscoveryDisabled => StatusCode::NOT_IMPLEMENTED,
            ApiError::ControlPlane(_) | ApiError::Discovery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
