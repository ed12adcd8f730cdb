use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use crate::admin::error::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::ProxyIntent;

pub async fn list_proxies(State(state): State<AppState>) -> Json<Vec<ProxyIntent>> {
    Json(state.client.list_proxies())
}

pub async fn list_container_proxies(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProxyIntent>>, ApiError> {
    let discovery = state.discovery.as_ref().ok_or(ApiError::DiscoveryDisabled)?;
    let proxies = discovery.discover().await?;
    Ok(Json(proxies))
}

pub async fn create_proxy(
    State(state): State<AppState>,
    body: Result<Json<ProxyIntent>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(intent) = body.map_err(|e| {
        tracing::debug!(error = %e, "Rejected proxy body");
        ApiError::InvalidBody
    })?;
    if intent.host_match.trim().is_empty() || intent.upstream.trim().is_empty() {
        return Err(ApiError::InvalidBody);
    }

    let rule = intent.to_routing_rule();
    tracing::info!(route_id = %rule.id, host = %intent.host_match, upstream = %intent.upstream, "Creating proxy");
    state.client.add_route(rule).await?;
    metrics::record_route_added("api");

    Ok((StatusCode::CREATED, Json(Value::Null)))
}

pub async fn delete_proxy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if matches!(id.as_str(), "." | "..") {
        return Err(ApiError::InvalidId);
    }

    tracing::info!(route_id = %id, "Deleting proxy");
    state.client.delete_route(&id).await?;
    metrics::record_route_deleted("api");

    if let Err(e) = state.client.refresh().await {
        tracing::warn!(error = %e, "Refresh after delete failed; next tick will converge");
    }

    Ok(Json(Value::Null))
}
