use std::net::SocketAddr;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Request, Uri},
    middleware,
    response::IntoResponse,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::api::{self, ApiError, AppState};
use crate::bootstrap::{build_service, build_store};
use crate::config::AppConfig;
use crate::middleware::{RequestId, request_id};

pub const API_PREFIX: &str = "/api/v1";

pub struct PatientServer {
    addr: SocketAddr,
    app: Router,
}

async fn no_route(uri: Uri) -> impl IntoResponse {
    ApiError::no_route(uri.path().to_string())
}

pub fn build_app(cfg: &AppConfig, state: AppState) -> Router {
    Router::new()
        .nest(API_PREFIX, api::routes(state))
        .fallback(no_route)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|req: &Request<_>| {
                            use tracing::field::Empty;
                            let req_id = req
                                .extensions()
                                .get::<RequestId>()
                                .and_then(|v| v.0.to_str().ok())
                                .unwrap_or("")
                                .to_string();
                            tracing::info_span!(
                                "http.request",
                                http.method = %req.method(),
                                http.target = %req.uri().path(),
                                http.status_code = Empty,
                                request_id = %req_id
                            )
                        })
                        .on_response(
                            |res: &axum::http::Response<_>,
                             latency: std::time::Duration,
                             span: &tracing::Span| {
                                span.record(
                                    "http.status_code",
                                    tracing::field::display(res.status().as_u16()),
                                );
                                tracing::info!(
                                    http.status = %res.status().as_u16(),
                                    elapsed_ms = %latency.as_millis(),
                                    "request handled"
                                );
                            },
                        ),
                )
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(cfg.request_timeout()))
                .layer(DefaultBodyLimit::max(cfg.server.body_limit_bytes)),
        )
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Opens the record store and assembles the router.
    pub async fn build(self) -> anyhow::Result<PatientServer> {
        let store = build_store(&self.config).await?;
        let service = build_service(&self.config, store);
        let app = build_app(&self.config, AppState::new(service));

        Ok(PatientServer {
            addr: self.addr,
            app,
        })
    }
}

impl PatientServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("shutdown signal received");
}
