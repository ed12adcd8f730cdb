use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use crate::admin::error::ApiError;
use crate::http::server::AppState;

/// Reject requests whose shared-secret header does not match the configured key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let authorized = request
        .headers()
        .get(state.admin.key_header.as_str())
        .and_then(|h| h.to_str().ok())
        .is_some_and(|key| key == state.admin.api_key);

    if authorized {
        return Ok(next.run(request).await);
    }

    tracing::warn!(
        method = %request.method(),
        path = %request.uri().path(),
        "Rejected request with invalid API key"
    );
    Err(ApiError::Unauthorized)
}
