//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the service router in middleware (timeout, request ID, tracing)
//! - Bind plain TCP or TLS according to the listener config
//! - Drain in-flight requests on shutdown

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::request::UuidRequestId;
use crate::net::tls::load_tls_config;
use crate::service::ServiceRouter;

/// Error raised while binding or serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid bind address '{address}': {source}")]
    InvalidAddress {
        address: String,
        source: std::net::AddrParseError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// HTTP server hosting the negotiated actions.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    pub fn new(config: ServiceConfig, service: ServiceRouter) -> Self {
        let router = Self::build_router(&config, service.into_router());
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, app: Router) -> Router {
        app.layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on an already-bound plaintext listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Bind according to the listener config and serve until shutdown.
    pub async fn serve(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
        let address = self.config.listener.bind_address.clone();
        let addr: SocketAddr = address
            .parse()
            .map_err(|source| ServerError::InvalidAddress { address, source })?;

        let Some(tls) = self.config.listener.tls.clone() else {
            let listener = TcpListener::bind(addr).await?;
            return self.run(listener, shutdown).await;
        };

        let rustls = load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path)).await?;
        let grace = Duration::from_secs(self.config.timeouts.shutdown_secs);
        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!(grace_secs = grace.as_secs(), "Shutdown signal received, draining connections");
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        tracing::info!(address = %addr, "HTTPS server starting");
        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}
