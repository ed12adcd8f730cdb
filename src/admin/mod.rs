//! Management API.
//!
//! # Endpoints
//! - `GET /proxies`: routes in the mirror, as `{id, upstream, match}`
//! - `GET /container-proxies`: what discovery would create right now
//! - `POST /proxies` (key): create a route from `{upstream, match}`
//! - `DELETE /proxies/{id}` (key): delete a route, then refresh the mirror

pub mod auth;
pub mod error;
pub mod handlers;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use crate::http::server::AppState;
use self::auth::require_api_key;
use self::handlers::*;

pub use error::ApiError;

pub fn setup_admin_router(state: AppState) -> Router {
    let auth = middleware::from_fn_with_state(state.clone(), require_api_key);

    Router::new()
        .route(
            "/proxies",
            get(list_proxies).merge(post(create_proxy).route_layer(auth.clone())),
        )
        .route("/proxies/{id}", delete(delete_proxy).route_layer(auth))
        .route("/container-proxies", get(list_container_proxies))
        .with_state(state)
}
