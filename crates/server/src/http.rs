//! HTTP server implementation using Axum

use async_trait::async_trait;
use axum::Router;
use parking_lot::RwLock;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::traits::Server;

/// HTTP server wrapping an Axum router
///
/// Every request passes through a tracing span and a permissive CORS layer.
/// On shutdown the server stops accepting connections and waits up to
/// `shutdown_timeout` for open ones, including live-feed sockets, to finish.
#[derive(Clone)]
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
    running: Arc<AtomicBool>,
    bound_addr: Arc<RwLock<Option<SocketAddr>>>,
}

impl HttpServer {
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self {
            config,
            router,
            running: Arc::new(AtomicBool::new(false)),
            bound_addr: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    fn app(&self) -> Router {
        self.router
            .clone()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }
}

async fn drain_deadline(token: CancellationToken, grace: Duration) {
    token.cancelled().await;
    tokio::time::sleep(grace).await;
}

#[async_trait]
impl Server for HttpServer {
    fn name(&self) -> &str {
        "http"
    }

    fn address(&self) -> Option<SocketAddr> {
        *self.bound_addr.read()
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn run(&self, shutdown_token: CancellationToken) -> Result<()> {
        let addr = self.config.http_addr()?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::bind(addr.to_string(), e))?;
        let local_addr = listener.local_addr()?;

        *self.bound_addr.write() = Some(local_addr);
        self.running.store(true, Ordering::SeqCst);
        info!(%local_addr, "HTTP server listening");

        let signal = shutdown_token.clone();
        let serve = axum::serve(listener, self.app())
            .with_graceful_shutdown(async move {
                signal.cancelled().await;
                info!("HTTP server received shutdown signal");
            })
            .into_future();
        tokio::pin!(serve);

        let grace = self.config.shutdown_timeout;
        let result = tokio::select! {
            result = &mut serve => result.map_err(ServerError::Io),
            _ = drain_deadline(shutdown_token, grace) => {
                Err(ServerError::ShutdownTimeout(grace.as_secs()))
            }
        };

        self.running.store(false, Ordering::SeqCst);
        *self.bound_addr.write() = None;

        match result {
            Ok(()) => {
                info!("HTTP server shutdown complete");
                Ok(())
            }
            Err(e @ ServerError::ShutdownTimeout(_)) => {
                warn!(%e, "Abandoning open connections");
                Err(e)
            }
            Err(e) => {
                error!(%e, "HTTP server error");
                Err(e)
            }
        }
    }
}
