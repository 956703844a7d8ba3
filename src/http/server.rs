//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum application around a frozen [`Router`]
//! - Wire up middleware (tracing, limits, request ID, timeout)
//! - Bind server to listener and stop on the shutdown signal
//! - Map dispatch outcomes onto HTTP responses

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::dispatch::{decode_path, RequestContext, Router};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Router,
    pub max_body_size: usize,
}

/// HTTP server hosting one router.
pub struct HttpServer {
    app: axum::Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RouterConfig, router: Router) -> Self {
        Self {
            app: Self::build_router(&config, router),
        }
    }

    /// Build the axum application with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &RouterConfig, router: Router) -> axum::Router {
        let state = AppState {
            router,
            max_body_size: config.limits.max_body_size,
        };

        axum::Router::new()
            .route("/health", get(health_handler))
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The assembled application, for in-process use.
    pub fn app(&self) -> axum::Router {
        self.app.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Fallback handler: everything not claimed by an explicit route.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let path = decode_path(parts.uri.path());

    let Some(matched) = state.router.route(method.as_str(), &path) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no route matches {} {}", method, path) })),
        )
            .into_response();
    };

    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, path = %path, error = %e, "Failed to read request body");
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "error": "request body could not be read" })),
            )
                .into_response();
        }
    };

    let route = matched.template().to_string();
    match matched.dispatch(RequestContext::from_parts(parts, body)).await {
        Ok(response) => response.into_http(),
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                route = %route,
                error = %e,
                "Dispatch failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal server error" })),
            )
                .into_response()
        }
    }
}
