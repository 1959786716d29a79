//! HTTP server.
//!
//! Serves normalized paper records over a small JSON API:
//! - `GET /paper/pubmed/{pmid}` and `GET /paper/arxiv/{arxiv_id}`
//! - `GET /pubmed/search` and `GET /arxiv/search`
//! - `GET /` and `GET /health` liveness

pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::sources::SourceRegistry;

/// HTTP gateway over the configured sources.
#[derive(Debug)]
pub struct PaperServer {
    sources: Arc<SourceRegistry>,
}

impl PaperServer {
    /// Create a new server.
    #[must_use]
    pub fn new(sources: SourceRegistry) -> Self {
        Self { sources: Arc::new(sources) }
    }

    /// Build the router without binding a socket.
    #[must_use]
    pub fn router(&self) -> axum::Router {
        routes::create_router(Arc::clone(&self.sources))
    }

    /// Run the server until ctrl-c.
    ///
    /// # Errors
    ///
    /// Returns error on bind or server failure.
    pub async fn run_http(self, port: u16) -> anyhow::Result<()> {
        let router = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server listening on http://{}", addr);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => {
            // Without a signal handler, keep serving until the process is killed.
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    }
}
