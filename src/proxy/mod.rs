pub mod handler;

use crate::backend::{AnalysisBackend, HttpBackend};
use crate::config::AppConfig;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Clone)]
pub struct ProxyState {
    pub backend: Arc<dyn AnalysisBackend>,
}

impl ProxyState {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self { backend }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error(transparent)]
    Backend(#[from] crate::model::BackendError),
    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Routes of the proxy. Upload size is not limited here.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/api/analyze", post(handler::analyze))
        .route("/api/health", get(handler::health))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// Runs the proxy until Ctrl-C.
pub async fn serve(config: &AppConfig) -> Result<(), ServeError> {
    let backend = HttpBackend::new(config.backend_url.clone(), config.backend_timeout)?;
    let app = router(ProxyState::new(Arc::new(backend)));

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(
        "Proxy listening on {} -> {}/analyze ({})",
        listener.local_addr()?,
        config.backend_url,
        config.run_mode
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Proxy stopped.");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received."),
        Err(e) => {
            warn!("Cannot listen for Ctrl-C, running until killed: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
