//! Control-plane API client and the local route mirror.
//!
//! # Responsibilities
//! - Bootstrap the base HTTP app config and the managed server when absent
//! - Keep an in-memory mirror of the managed server's route table
//! - Create routes idempotently (existence probe before every create)
//! - Delete routes by id and re-derive the mirror from the remote state

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use url::Url;

use crate::config::ControlPlaneConfig;
use crate::control_plane::error::{ControlPlaneError, ControlPlaneResult};
use crate::observability::metrics;
use crate::routing::{ProxyIntent, RoutingRule, ServerRoutes};

/// Skeleton posted to `/config/` when no HTTP app exists yet.
pub fn base_config() -> serde_json::Value {
    serde_json::json!({ "apps": { "http": { "servers": {} } } })
}

/// Client for the remote control-plane admin API.
///
/// Shared by the management handlers and the reconciliation loop; all mirror
/// access goes through an internal mutex that is never held across `.await`.
pub struct ControlPlaneClient {
    http: reqwest::Client,
    base_url: Url,
    server_name: String,
    default_listen: Vec<String>,
    /// Local copy of the server's `{listen, routes}`.
    mirror: Mutex<ServerRoutes>,
    /// Serializes probe → create → append so one id is created at most once.
    create_gate: tokio::sync::Mutex<()>,
}

impl ControlPlaneClient {
    /// Create a client. Performs no I/O; call [`initialize`](Self::initialize) next.
    pub fn new(config: &ControlPlaneConfig) -> ControlPlaneResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ControlPlaneError::InvalidConfig(format!("base url '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ControlPlaneError::InvalidConfig(format!(
                "base url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ControlPlaneError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            server_name: config.server_name.clone(),
            default_listen: config.default_listen.clone(),
            mirror: Mutex::new(ServerRoutes::default()),
            create_gate: tokio::sync::Mutex::new(()),
        })
    }

    /// Ensure the base config and the managed server exist, then load the mirror.
    pub async fn initialize(&self) -> ControlPlaneResult<()> {
        self.ensure_base_config().await?;
        self.load_server().await?;

        tracing::info!(
            base_url = %self.base_url,
            server = %self.server_name,
            routes = self.lock_mirror().routes.len(),
            "Control plane client initialized"
        );
        Ok(())
    }

    /// Project the mirror into proxy intents. Never touches the network.
    pub fn list_proxies(&self) -> Vec<ProxyIntent> {
        self.lock_mirror()
            .routes
            .iter()
            .filter_map(RoutingRule::to_intent)
            .collect()
    }

    /// Snapshot of the mirror.
    pub fn mirror(&self) -> ServerRoutes {
        self.lock_mirror().clone()
    }

    /// Probe the control plane for an object path such as `id/<route id>`.
    ///
    /// Any failure, non-200 status or literal `null` body counts as absent.
    pub async fn object_exists(&self, path: &str) -> bool {
        self.exists_at(self.url(path)).await
    }

    /// Probe for a route by id. The id is always sent as a single path segment.
    pub async fn route_exists(&self, id: &str) -> bool {
        self.exists_at(self.route_url(id)).await
    }

    /// Create a route unless one with the same id already exists.
    ///
    /// The mirror is appended to only after the remote create succeeded.
    pub async fn add_route(&self, rule: RoutingRule) -> ControlPlaneResult<()> {
        let _gate = self.create_gate.lock().await;

        if self.route_exists(&rule.id).await {
            return Err(ControlPlaneError::RouteAlreadyExists(rule.id));
        }

        let url = self.url(&format!("{}/routes", self.server_path()));
        let result = self
            .send(Method::POST, &url, Some(&rule))
            .await
            .and_then(|response| expect_success(Method::POST, &url, response));
        if let Err(e) = result {
            metrics::record_control_plane_error("add_route");
            return Err(e);
        }

        tracing::info!(route_id = %rule.id, "Route created");
        let mut mirror = self.lock_mirror();
        mirror.routes.push(rule);
        metrics::set_mirror_routes(mirror.routes.len());
        Ok(())
    }

    /// Delete an object by path, e.g. `config/apps/http/servers/<name>`.
    ///
    /// A 404 means the object is already gone and counts as success. The
    /// mirror is left alone; callers refresh afterwards.
    pub async fn delete_object(&self, path: &str) -> ControlPlaneResult<()> {
        self.delete_at(self.url(path)).await
    }

    /// Delete a route by id through `DELETE /id/<id>`.
    ///
    /// The id is percent-encoded as one segment, so it can never address
    /// anything other than a route.
    pub async fn delete_route(&self, id: &str) -> ControlPlaneResult<()> {
        self.delete_at(self.route_url(id)).await
    }

    /// Replace the mirror with the server's current route table.
    pub async fn refresh(&self) -> ControlPlaneResult<()> {
        let result = self.load_server().await;
        if result.is_err() {
            metrics::record_control_plane_error("refresh");
        }
        result
    }

    async fn exists_at(&self, url: Url) -> bool {
        match self.send(Method::GET, &url, None::<&()>).await {
            Ok((status, body)) => status == StatusCode::OK && !is_null_body(&body),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Existence probe failed, assuming absent");
                false
            }
        }
    }

    async fn delete_at(&self, url: Url) -> ControlPlaneResult<()> {
        let (status, body) = match self.send(Method::DELETE, &url, None::<&()>).await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_control_plane_error("delete");
                return Err(e);
            }
        };

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(url = %url, "Object already absent");
            return Ok(());
        }
        if let Err(e) = expect_success(Method::DELETE, &url, (status, body)) {
            metrics::record_control_plane_error("delete");
            return Err(e);
        }

        tracing::info!(url = %url, "Object deleted");
        Ok(())
    }

    async fn ensure_base_config(&self) -> ControlPlaneResult<()> {
        let (status, _) = self
            .send(Method::GET, &self.url("config/apps/http/servers"), None::<&()>)
            .await?;
        if status.is_success() {
            return Ok(());
        }

        tracing::info!(status = %status, "HTTP app config absent, bootstrapping");
        let url = self.url("config/");
        let response = self.send(Method::POST, &url, Some(&base_config())).await?;
        expect_success(Method::POST, &url, response)
    }

    async fn load_server(&self) -> ControlPlaneResult<()> {
        let url = self.url(&self.server_path());
        let (status, body) = self.send(Method::GET, &url, None::<&()>).await?;

        let server = if status != StatusCode::OK || is_null_body(&body) {
            let server = ServerRoutes::bootstrap(&self.default_listen);
            tracing::info!(server = %self.server_name, listen = ?server.listen, "Server absent, bootstrapping");
            let response = self.send(Method::POST, &url, Some(&server)).await?;
            expect_success(Method::POST, &url, response)?;
            server
        } else {
            serde_json::from_str::<ServerRoutes>(&body).map_err(|source| ControlPlaneError::Decode {
                url: url.to_string(),
                source,
            })?
        };

        let mut mirror = self.lock_mirror();
        *mirror = server;
        metrics::set_mirror_routes(mirror.routes.len());
        Ok(())
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&B>,
    ) -> ControlPlaneResult<(StatusCode, String)> {
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let transport = |source| ControlPlaneError::Transport {
            method: method.clone(),
            url: url.to_string(),
            source,
        };
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        tracing::trace!(method = %method, url = %url, status = %status, "Control plane call");
        Ok((status, text))
    }

    fn server_path(&self) -> String {
        format!("config/apps/http/servers/{}", self.server_name)
    }

    /// Resolve a `/`-separated object path below the base URL.
    fn url(&self, path: &str) -> Url {
        self.join(path.trim_start_matches('/').split('/'))
    }

    fn route_url(&self, id: &str) -> Url {
        self.join(["id", id])
    }

    /// Append path segments, percent-encoding each one. Dot segments are dropped.
    fn join<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn lock_mirror(&self) -> MutexGuard<'_, ServerRoutes> {
        self.mirror.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ControlPlaneClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPlaneClient")
            .field("base_url", &self.base_url.as_str())
            .field("server_name", &self.server_name)
            .finish()
    }
}

fn expect_success(method: Method, url: &Url, (status, body): (StatusCode, String)) -> ControlPlaneResult<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(ControlPlaneError::RemoteStatus {
        method,
        url: url.to_string(),
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}

fn is_null_body(body: &str) -> bool {
    body.trim() == "null"
}
