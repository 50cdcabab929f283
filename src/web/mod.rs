//! Web server module.

mod handlers;

pub use handlers::*;

use crate::config::ServerConfig;
use crate::fetch::HttpSource;
use crate::scheduler::PollCoordinator;

use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<PollCoordinator<HttpSource>>,
}

/// Web server exposing the published record and the manual refresh trigger.
pub struct Server {
    port: u16,
    state: AppState,
}

impl Server {
    /// Create a new server with the given dependencies.
    pub fn new(config: &ServerConfig, coordinator: Arc<PollCoordinator<HttpSource>>) -> Self {
        Self {
            port: config.http_port,
            state: AppState { coordinator },
        }
    }

    /// Build the router with all routes.
    fn routes(&self) -> Router {
        let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

        Router::new()
            .route("/api/typhoon", get(handlers::handle_get_typhoon))
            .route("/api/refresh", post(handlers::handle_refresh))
            .route("/health", get(handlers::handle_health))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the server on the configured port and run until Ctrl-C.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.serve(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves, then drain open connections.
    pub async fn serve<F>(&self, shutdown: F) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let router = self.routes();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Web server listening on {}", listener.local_addr()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Web server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serve_returns_on_shutdown() {
        let cfg = ServerConfig {
            http_port: 0,
            ..ServerConfig::default()
        };
        let coordinator = Arc::new(PollCoordinator::new(
            HttpSource::new().unwrap(),
            cfg.poll_settings(),
        ));
        let server = Server::new(&cfg, coordinator);

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            server
                .serve(async move {
                    let _ = rx.await;
                })
                .await
                .map_err(|e| e.to_string())
        });

        tx.send(()).unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
