//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the management handlers
//! - Serve frontend assets from a directory, if configured
//! - Wire up middleware (CORS, request ID, tracing, timeout)
//! - Bind server to listener and stop on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::{AdminConfig, ListenerConfig};
use crate::control_plane::ControlPlaneClient;
use crate::discovery::LabelDiscovery;
use crate::lifecycle::Shutdown;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<ControlPlaneClient>,
    /// `None` when discovery is disabled.
    pub discovery: Option<LabelDiscovery>,
    pub admin: Arc<AdminConfig>,
}

/// HTTP server for the management API.
pub struct ManagementServer {
    router: Router,
}

impl ManagementServer {
    pub fn new(state: AppState, config: &ListenerConfig) -> Self {
        Self {
            router: Self::build_router(state, config),
        }
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState, config: &ListenerConfig) -> Router {
        let mut router = setup_admin_router(state);
        if let Some(dir) = &config.static_dir {
            router = router.fallback_service(ServeDir::new(dir));
        }

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        // CORS is outermost: it answers every OPTIONS with 200 before auth or routing.
        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(cors)
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Management API listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("Management API stopped");
        Ok(())
    }
}
