//! Server Implementation
//!
//! HTTP + Socket.IO 服务器启动和管理

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{Router, middleware};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result, ServerState};
use crate::utils::periodic_cleanup;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());

    response
}

/// Build the fully layered application for a state
pub fn build_router(state: ServerState) -> Router {
    crate::api::build_app().with_state(state).layer(
        ServiceBuilder::new()
            // Request logging - outermost, executed first
            .layer(middleware::from_fn(log_request))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

/// HTTP Server
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<()> {
        let mut tasks = BackgroundTasks::new();

        let (state, socket_layer) = ServerState::initialize(&self.config, &mut tasks).await?;

        let shutdown_token = tasks.shutdown_token();
        tasks.spawn(
            "log_cleanup",
            TaskKind::Periodic,
            periodic_cleanup(PathBuf::from(self.config.log_dir()), shutdown_token),
        );
        tasks.log_summary();

        let app = build_router(state.clone()).layer(socket_layer);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "KDS server listening");

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        if tasks.check_health() > 0 {
            tracing::warn!("Some background tasks exited before shutdown");
        }
        state.workflow.shutdown();
        tasks.shutdown().await;

        tracing::info!("Server stopped");
        Ok(())
    }
}
