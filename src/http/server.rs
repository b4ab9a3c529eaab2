//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all dispatcher
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Dispatch requests through the route table
//! - Buffer request bodies for handlers
//! - Flush the store once the server has drained

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, FromRequest, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::http::request::RouteRequest;
use crate::observability::metrics;
use crate::resources;
use crate::routing::RouteTable;
use crate::store::Database;

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
}

/// HTTP server for the task API.
pub struct ApiServer {
    router: Router,
    config: ApiConfig,
    database: Database,
}

impl ApiServer {
    /// Create a new server serving the standard route table over `database`.
    pub fn new(config: ApiConfig, database: Database) -> Self {
        let routes = resources::routes(&database);
        Self::with_routes(config, database, routes)
    }

    /// Create a server with a custom route table.
    pub fn with_routes(config: ApiConfig, database: Database, routes: RouteTable) -> Self {
        tracing::debug!(routes = routes.len(), "Route table built");
        let state = AppState {
            routes: Arc::new(routes),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            database,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ApiConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// A clone of the fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then flush pending writes.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        self.database.flush().await;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: looks up the route, buffers the body, runs the handler.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        target = %target,
        "Dispatching request"
    );

    let Some(matched) = state.routes.match_request(&method, &target) else {
        tracing::warn!(request_id = %request_id, method = %method, path = %path, "No route matched");
        metrics::record_request(method.as_str(), 404, "none", start_time);
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Rota não encontrada" })),
        )
            .into_response();
    };

    // Chunked bodies only hit the size limit here, while being buffered.
    let body = match Bytes::from_request(request, &state).await {
        Ok(bytes) => bytes,
        Err(rejection) => {
            let status = rejection.status();
            let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
                "Corpo da requisição excede o limite"
            } else {
                "Corpo da requisição inválido"
            };
            tracing::warn!(request_id = %request_id, error = %rejection.body_text(), "Failed to read request body");
            metrics::record_request(method.as_str(), status.as_u16(), matched.route.template(), start_time);
            return (status, Json(json!({ "message": message }))).into_response();
        }
    };

    let route = matched.route;
    let response = match route.handle(RouteRequest::new(
        method.clone(),
        path.as_str(),
        matched.path_match,
        body,
    )) {
        Ok(response) => response.into_response(),
        Err(e) => e.into_response(),
    };

    let status = response.status();
    tracing::debug!(
        request_id = %request_id,
        route = route.template(),
        status = status.as_u16(),
        "Request handled"
    );
    metrics::record_request(method.as_str(), status.as_u16(), route.template(), start_time);

    response
}
