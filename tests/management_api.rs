//! Management API routed in-process against a fake control plane.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use proxy_manager::config::{AdminConfig, DiscoveryConfig, ListenerConfig};
use proxy_manager::control_plane::ControlPlaneClient;
use proxy_manager::discovery::{LabelDiscovery, WorkloadSource};
use proxy_manager::http::{AppState, ManagementServer};
use proxy_manager::routing::derive_id;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

const KEY: &str = "test-key";

async fn setup(source: Option<Arc<dyn WorkloadSource>>) -> (Router, common::SharedFake) {
    let (base_url, fake) = common::start_fake_control_plane().await;
    let client = ControlPlaneClient::new(&common::control_plane_config(&base_url)).unwrap();
    client.initialize().await.unwrap();

    let state = AppState {
        client: Arc::new(client),
        discovery: source.map(|s| LabelDiscovery::new(s, &DiscoveryConfig::default())),
        admin: Arc::new(AdminConfig {
            api_key: KEY.to_string(),
            ..AdminConfig::default()
        }),
    };
    let server = ManagementServer::new(state, &ListenerConfig::default());
    (server.router(), fake)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_proxy(key: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/proxies")
        .header("X-Key", key)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete_proxy(key: &str, id: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(format!("/proxies/{id}"))
        .header("X-Key", key)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_create_then_list() {
    let (router, fake) = setup(None).await;

    let (status, body) = send(
        &router,
        post_proxy(KEY, r#"{"upstream":"localhost:9000","match":"a.example.com"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, Value::Null);
    assert_eq!(fake.lock().unwrap().route_creates, 1);

    let (status, body) = send(&router, get("/proxies")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{ "id": derive_id("a.example.com"), "upstream": "localhost:9000", "match": "a.example.com" }])
    );
}

#[tokio::test]
async fn test_create_with_wrong_key() {
    let (router, fake) = setup(None).await;

    let (status, body) = send(
        &router,
        post_proxy("wrong", r#"{"upstream":"localhost:9000","match":"a.example.com"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid API key" }));
    assert_eq!(fake.lock().unwrap().route_creates, 0);
    assert!(fake.lock().unwrap().route_ids("srv0").is_empty());
}

#[tokio::test]
async fn test_create_with_missing_key() {
    let (router, _fake) = setup(None).await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/proxies")
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"upstream":"localhost:9000","match":"a.example.com"}"#))
        .unwrap();

    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_with_bad_body() {
    let (router, fake) = setup(None).await;

    for body in ["not json", r#"{"upstream":"localhost:9000"}"#, r#"{"upstream":"","match":"a.example.com"}"#] {
        let (status, response) = send(&router, post_proxy(KEY, body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(response, json!({ "error": "Invalid request body" }));
    }
    assert_eq!(fake.lock().unwrap().route_creates, 0);
}

#[tokio::test]
async fn test_create_duplicate() {
    let (router, fake) = setup(None).await;
    let body = r#"{"upstream":"localhost:9000","match":"a.example.com"}"#;

    let (status, _) = send(&router, post_proxy(KEY, body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, response) = send(&router, post_proxy(KEY, body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response["error"].as_str().unwrap().contains("already exists"));
    assert_eq!(fake.lock().unwrap().route_creates, 1);
}

#[tokio::test]
async fn test_delete_refreshes_mirror() {
    let (router, fake) = setup(None).await;
    let id = derive_id("a.example.com");
    send(
        &router,
        post_proxy(KEY, r#"{"upstream":"localhost:9000","match":"a.example.com"}"#),
    )
    .await;

    let (status, body) = send(&router, delete_proxy(KEY, &id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
    assert!(fake.lock().unwrap().route_ids("srv0").is_empty());

    let (_, proxies) = send(&router, get("/proxies")).await;
    assert_eq!(proxies, json!([]));
}

#[tokio::test]
async fn test_delete_nonexistent_id() {
    let (router, fake) = setup(None).await;

    let (status, _) = send(&router, delete_proxy(KEY, "0123456789abcdef")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fake.lock().unwrap().deletes, vec!["0123456789abcdef".to_string()]);
}

#[tokio::test]
async fn test_delete_id_cannot_escape_route_namespace() {
    let (router, fake) = setup(None).await;
    send(
        &router,
        post_proxy(KEY, r#"{"upstream":"localhost:9000","match":"a.example.com"}"#),
    )
    .await;
    fake.lock().unwrap().requests.clear();

    let (status, _) = send(&router, delete_proxy(KEY, "..%2Fconfig%2Fapps")).await;
    assert_eq!(status, StatusCode::OK);

    let fake = fake.lock().unwrap();
    assert_eq!(fake.deletes, vec!["../config/apps".to_string()]);
    let deletes: Vec<&str> = fake
        .requests
        .iter()
        .map(String::as_str)
        .filter(|r| r.starts_with("DELETE "))
        .collect();
    assert_eq!(deletes, vec!["DELETE /id/..%2Fconfig%2Fapps"]);
    assert!(fake.has_base);
    assert_eq!(fake.route_ids("srv0"), vec![derive_id("a.example.com")]);
}

#[tokio::test]
async fn test_delete_dot_segment_id_rejected() {
    let (router, fake) = setup(None).await;

    for id in ["%2E", "%2E%2E"] {
        let (status, body) = send(&router, delete_proxy(KEY, id)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "id: {id}");
        assert_eq!(body, json!({ "error": "Invalid proxy id" }));
    }
    assert!(fake.lock().unwrap().requests.iter().all(|r| !r.starts_with("DELETE ")));
}

#[tokio::test]
async fn test_delete_with_wrong_key() {
    let (router, fake) = setup(None).await;

    let (status, _) = send(&router, delete_proxy("wrong", "0123456789abcdef")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(fake.lock().unwrap().deletes.is_empty());
}

#[tokio::test]
async fn test_container_proxies_disabled() {
    let (router, _fake) = setup(None).await;

    let (status, body) = send(&router, get("/container-proxies")).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body, json!({ "error": "Discovery not enabled" }));
}

#[tokio::test]
async fn test_container_proxies_listed() {
    let source = common::StaticWorkloads::new(vec![
        common::workload("web", &[common::ENABLED], &[8080]),
        common::workload("db", &[], &[5432]),
    ]);
    let (router, fake) = setup(Some(Arc::new(source))).await;

    let (status, body) = send(&router, get("/container-proxies")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{ "id": derive_id("web.example.com"), "upstream": "localhost:8080", "match": "web.example.com" }])
    );
    // Listing is read-only.
    assert_eq!(fake.lock().unwrap().route_creates, 0);
}

#[tokio::test]
async fn test_container_proxies_runtime_down() {
    let (router, _fake) = setup(Some(Arc::new(common::UnreachableRuntime))).await;

    let (status, body) = send(&router, get("/container-proxies")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("unavailable"));
}

#[tokio::test]
async fn test_options_short_circuits() {
    let (router, fake) = setup(None).await;

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/proxies")
        .header("Origin", "http://ui.example.com")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "x-key, content-type")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(preflight).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    let bare = Request::builder()
        .method(Method::OPTIONS)
        .uri("/proxies/anything")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(bare).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(fake.lock().unwrap().deletes.is_empty());
}

#[tokio::test]
async fn test_responses_carry_cors_and_request_id() {
    let (router, _fake) = setup(None).await;
    let request = Request::builder()
        .uri("/proxies")
        .header("Origin", "http://ui.example.com")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert!(response.headers().contains_key("x-request-id"));
}
