//! Application startup and lifecycle management.

use crate::config::RelayConfig;
use crate::handlers::{api, health, metrics};
use crate::services::metrics::http_metrics_middleware;
use crate::services::providers::gemini::GeminiProvider;
use crate::services::providers::GenerativeProvider;
use crate::services::{Invoker, RelayMetrics};
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Headroom for multipart boundaries and part headers on top of the file limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub invoker: Invoker,
    pub metrics: Arc<RelayMetrics>,
}

impl AppState {
    pub fn new(
        config: RelayConfig,
        provider: Arc<dyn GenerativeProvider>,
    ) -> Result<Self, AppError> {
        let metrics = Arc::new(RelayMetrics::new().map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to create metrics registry: {}", e))
        })?);

        Ok(Self {
            config: Arc::new(config),
            invoker: Invoker::new(provider, metrics.clone()),
            metrics,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state
        .config
        .limits
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let mut router = Router::new()
        .route("/api/chat", post(api::chat))
        .route("/api/image", post(api::image))
        .route(
            "/api/upload",
            post(api::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(metrics::metrics));

    if let Some(dir) = &state.config.static_dir {
        tracing::info!(dir = %dir, "Serving static assets");
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(from_fn_with_state(
            state.metrics.clone(),
            http_metrics_middleware,
        ))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| make_request_span(request)),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    server: Box<dyn Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    /// Build the application against the configured Gemini upstream.
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        let provider = GeminiProvider::new(config.upstream.clone()).map_err(|e| {
            tracing::error!("Failed to initialize Gemini provider: {}", e);
            AppError::ConfigError(anyhow::anyhow!(e.to_string()))
        })?;

        tracing::info!(
            text_model = %config.upstream.text_model,
            image_model = %config.upstream.image_model,
            timeout = ?config.upstream.timeout,
            "Initialized Gemini provider"
        );

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build the application with an explicit provider (used by tests).
    pub async fn build_with_provider(
        config: RelayConfig,
        provider: Arc<dyn GenerativeProvider>,
    ) -> Result<Self, AppError> {
        let addr = config.common.bind_address();
        let state = AppState::new(config, provider)?;
        let app = build_router(state);

        // Port 0 = random port for testing
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Relay service listening on port {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LimitsConfig, ObservabilityConfig, UpstreamConfig};
    use crate::services::providers::mock::MockProvider;
    use axum::http::{header, StatusCode};
    use http_body_util::BodyExt;
    use secrecy::Secret;
    use tower::util::ServiceExt;

    fn config(static_dir: Option<String>) -> RelayConfig {
        RelayConfig {
            common: service_core::config::Config {
                port: 0,
                ..Default::default()
            },
            upstream: UpstreamConfig {
                api_key: Secret::new("k".to_string()),
                api_base: "http://127.0.0.1:1".to_string(),
                text_model: "text".to_string(),
                image_model: "image".to_string(),
                timeout: None,
            },
            limits: LimitsConfig {
                max_upload_bytes: 1024,
            },
            static_dir,
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                otlp_endpoint: None,
            },
        }
    }

    fn router(static_dir: Option<String>) -> Router {
        let state = AppState::new(config(static_dir), Arc::new(MockProvider::echo())).unwrap();
        build_router(state)
    }

    #[tokio::test]
    async fn static_assets_are_served_with_page_policy() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>DTZ</h1>").unwrap();

        let response = router(Some(dir.path().display().to_string()))
            .oneshot(
                Request::builder()
                    .uri("/index.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let csp = response.headers()[header::CONTENT_SECURITY_POLICY]
            .to_str()
            .unwrap()
            .to_string();
        assert!(csp.contains("img-src 'self' data:"));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<h1>DTZ</h1>");
    }

    #[tokio::test]
    async fn chat_route_returns_envelope() {
        let response = router(None)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"prompt":"hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
    }
}
