//! Shared utilities for integration testing.
//!
//! `start_fake_control_plane` serves the subset of the control-plane admin API
//! the manager uses, backed by an in-memory config tree.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use proxy_manager::config::ControlPlaneConfig;
use proxy_manager::discovery::{DiscoveryError, DiscoveryResult, Workload, WorkloadSource};
use proxy_manager::routing::ProxyIntent;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// In-memory control-plane state.
#[derive(Debug, Default)]
pub struct FakeState {
    /// Whether `apps.http.servers` exists.
    pub has_base: bool,
    /// Server name → raw server JSON.
    pub servers: HashMap<String, Value>,
    /// Successful `POST .../routes` calls.
    pub route_creates: usize,
    /// Ids passed to `DELETE /id/{id}`, found or not.
    pub deletes: Vec<String>,
    /// Answer route creates with 500.
    pub fail_route_creates: bool,
    /// Every request received, as `"<METHOD> <raw path>"`.
    pub requests: Vec<String>,
}

impl FakeState {
    /// Insert a route directly, as an external editor of the control plane would.
    pub fn push_route(&mut self, server: &str, intent: &ProxyIntent) {
        let rule = serde_json::to_value(intent.to_routing_rule()).unwrap();
        self.servers
            .entry(server.to_string())
            .or_insert_with(|| json!({ "listen": [":443"], "routes": [] }))["routes"]
            .as_array_mut()
            .unwrap()
            .push(rule);
    }

    pub fn route_ids(&self, server: &str) -> Vec<String> {
        self.servers
            .get(server)
            .and_then(|s| s["routes"].as_array())
            .map(|routes| {
                routes
                    .iter()
                    .filter_map(|r| r["@id"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn find_route(&self, id: &str) -> Option<Value> {
        self.servers
            .values()
            .filter_map(|s| s["routes"].as_array())
            .flatten()
            .find(|r| r["@id"] == id)
            .cloned()
    }

    fn remove_route(&mut self, id: &str) -> bool {
        let mut removed = false;
        for server in self.servers.values_mut() {
            if let Some(routes) = server["routes"].as_array_mut() {
                let before = routes.len();
                routes.retain(|r| r["@id"] != id);
                removed |= routes.len() != before;
            }
        }
        removed
    }
}

pub type SharedFake = Arc<Mutex<FakeState>>;

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
}

fn null_body() -> Response {
    (StatusCode::OK, "null\n").into_response()
}

async fn get_servers(State(fake): State<SharedFake>) -> Response {
    let fake = fake.lock().unwrap();
    if !fake.has_base {
        return not_found("path not found: apps");
    }
    Json(json!(fake.servers)).into_response()
}

async fn post_config(State(fake): State<SharedFake>, Json(body): Json<Value>) -> Response {
    let mut fake = fake.lock().unwrap();
    if body.pointer("/apps/http/servers").is_none() {
        return (StatusCode::BAD_REQUEST, "unexpected base config").into_response();
    }
    fake.has_base = true;
    fake.servers.clear();
    StatusCode::OK.into_response()
}

async fn get_server(State(fake): State<SharedFake>, Path(name): Path<String>) -> Response {
    let fake = fake.lock().unwrap();
    if !fake.has_base {
        return not_found("path not found: apps");
    }
    match fake.servers.get(&name) {
        Some(server) => Json(server.clone()).into_response(),
        None => null_body(),
    }
}

async fn post_server(
    State(fake): State<SharedFake>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut fake = fake.lock().unwrap();
    if !fake.has_base {
        return not_found("path not found: apps");
    }
    fake.servers.insert(name, body);
    StatusCode::OK.into_response()
}

async fn post_route(
    State(fake): State<SharedFake>,
    Path(name): Path<String>,
    Json(rule): Json<Value>,
) -> Response {
    let mut fake = fake.lock().unwrap();
    if fake.fail_route_creates {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "injected failure" }))).into_response();
    }
    let Some(routes) = fake.servers.get_mut(&name).and_then(|s| s["routes"].as_array_mut()) else {
        return not_found("unknown server");
    };
    routes.push(rule);
    fake.route_creates += 1;
    StatusCode::OK.into_response()
}

async fn get_by_id(State(fake): State<SharedFake>, Path(id): Path<String>) -> Response {
    let fake = fake.lock().unwrap();
    match fake.find_route(&id) {
        Some(route) => Json(route).into_response(),
        None => not_found("unknown object ID"),
    }
}

async fn delete_by_id(State(fake): State<SharedFake>, Path(id): Path<String>) -> Response {
    let mut fake = fake.lock().unwrap();
    fake.deletes.push(id.clone());
    if fake.remove_route(&id) {
        StatusCode::OK.into_response()
    } else {
        not_found("unknown object ID")
    }
}

async fn record_request(State(fake): State<SharedFake>, request: Request, next: Next) -> Response {
    let line = format!("{} {}", request.method(), request.uri().path());
    fake.lock().unwrap().requests.push(line);
    next.run(request).await
}

/// Start a fake control plane on an ephemeral port.
///
/// Returns its base URL and a handle on its state.
pub async fn start_fake_control_plane() -> (String, SharedFake) {
    let fake: SharedFake = Arc::new(Mutex::new(FakeState::default()));

    let app = Router::new()
        .route("/config/", post(post_config))
        .route("/config/apps/http/servers", get(get_servers))
        .route("/config/apps/http/servers/{name}", get(get_server).post(post_server))
        .route("/config/apps/http/servers/{name}/routes", post(post_route))
        .route("/id/{id}", get(get_by_id).delete(delete_by_id))
        .layer(middleware::from_fn_with_state(fake.clone(), record_request))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}", addr), fake)
}

pub fn control_plane_config(base_url: &str) -> ControlPlaneConfig {
    ControlPlaneConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
        ..ControlPlaneConfig::default()
    }
}

/// Workload source returning a fixed, replaceable list.
#[derive(Default)]
pub struct StaticWorkloads {
    workloads: Mutex<Vec<Workload>>,
}

impl StaticWorkloads {
    pub fn new(workloads: Vec<Workload>) -> Self {
        Self {
            workloads: Mutex::new(workloads),
        }
    }

    pub fn replace(&self, workloads: Vec<Workload>) {
        *self.workloads.lock().unwrap() = workloads;
    }
}

#[async_trait]
impl WorkloadSource for StaticWorkloads {
    async fn list_workloads(&self) -> DiscoveryResult<Vec<Workload>> {
        Ok(self.workloads.lock().unwrap().clone())
    }
}

/// Workload source whose runtime is always down.
pub struct UnreachableRuntime;

#[async_trait]
impl WorkloadSource for UnreachableRuntime {
    async fn list_workloads(&self) -> DiscoveryResult<Vec<Workload>> {
        Err(DiscoveryError::Unavailable("connection refused".into()))
    }
}

/// A running workload with the given name, labels and published ports.
pub fn workload(name: &str, labels: &[(&str, &str)], ports: &[u16]) -> Workload {
    Workload {
        name: Some(name.to_string()),
        labels: labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        published_ports: ports.to_vec(),
    }
}

pub const ENABLED: (&str, &str) = ("proxy-manager.enable", "true");
