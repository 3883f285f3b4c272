//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with auth, environment and health handlers
//! - Send everything under the reserved prefix to the proxy dispatcher
//! - Wire up middleware (request ID, tracing, CORS, timeout, body limit)
//! - Serve on a listener until shutdown is signalled
//!
//! # Layer order (outermost first)
//! ```text
//! SetRequestId → Trace → PropagateRequestId → CORS → Timeout → BodyLimit → routes
//! ```
//! CORS sits outside the timeout so even a timed-out request gets the
//! allow-origin headers its origin is entitled to.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth;
use crate::config::GatewayConfig;
use crate::environment::handlers::{get_environment, set_environment};
use crate::environment::{EnvironmentError, EnvironmentResolver};
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response::ApiError;
use crate::proxy::{ProxyDispatcher, ProxyRoute, UpstreamClient};
use crate::security::{cors_middleware, CorsPolicy};
use crate::session::SessionPolicy;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub environments: Arc<EnvironmentResolver>,
    pub dispatcher: ProxyDispatcher,
    pub session: Arc<SessionPolicy>,
    pub cors: Arc<CorsPolicy>,
}

impl AppState {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, EnvironmentError> {
        let environments = Arc::new(EnvironmentResolver::from_config(&config.environments)?);
        let dispatcher = ProxyDispatcher::new(
            ProxyRoute::from_config(&config.proxy),
            UpstreamClient::new(&config.timeouts, &config.security),
        );

        Ok(Self {
            environments,
            dispatcher,
            session: Arc::new(SessionPolicy::from_config(&config.session)),
            cors: Arc::new(CorsPolicy::from_config(&config.cors)),
        })
    }
}

/// `GET /healthz` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub environment: String,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, EnvironmentError> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            state,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let cors = state.cors.clone();

        Router::new()
            .route("/api/auth/login", post(auth::login))
            .route("/api/auth/logout", delete(auth::logout))
            .route("/api/auth/me", get(auth::me))
            .route("/api/auth/register", post(auth::register))
            .route("/api/environment/set", get(get_environment).post(set_environment))
            .route("/logout", get(auth::logout_page))
            .route("/healthz", get(health_handler))
            .fallback(proxy_handler)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn_with_state(cors, cors_middleware))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let current = self.state.environments.get();
        tracing::info!(
            address = %addr,
            environment = %current.name,
            backend_url = %current.backend_url,
            proxy_prefix = %self.state.dispatcher.route().prefix(),
            allowed_origins = self.state.cors.origins().len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Fallback handler: reserved-prefix requests go upstream, the rest is 404.
async fn proxy_handler(State(state): State<AppState>, request: Request) -> Response {
    let path = request.uri().path();
    if !state.dispatcher.handles(path) {
        tracing::debug!(
            request_id = %request_id(request.headers()),
            method = %request.method(),
            path = %path,
            "No route matched"
        );
        return ApiError::new(StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let target = state.environments.resolve(request.headers());
    state.dispatcher.forward(&target, request).await
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.environments.get().name.clone(),
    })
}
