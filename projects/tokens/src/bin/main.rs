use std::{net::SocketAddr, sync::Arc};

use axum::serve;
use projects_tokens::{
    config::{Config, ConfigError},
    endpoints::router,
    poller,
    state::AppState,
};
use thiserror::Error;
use tokio::signal;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum MainError {
    #[error("LoadConfig: {source}")]
    LoadConfig {
        #[source]
        source: ConfigError,
    },
    #[error("TracingInit: {source}")]
    TracingInit {
        #[source]
        source: utils_trace::TracingInitError,
    },
    #[error("BuildClient: {source}")]
    BuildClient {
        #[source]
        source: interfaces_bytelabs_hot_tokens::index::BuildClientError,
    },
    #[error("TcpListenerBind: {source}")]
    TcpListenerBind {
        #[source]
        source: std::io::Error,
    },
    #[error("Serve: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let dotenv = dotenvy::dotenv();

    let config = Config::from_env().map_err(|source| MainError::LoadConfig { source })?;

    utils_trace::init(&config.log_level, config.log_format)
        .map_err(|source| MainError::TracingInit { source })?;

    if let Err(err) = dotenv {
        if !err.not_found() {
            warn!(error = %err, "failed to read .env file");
        }
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(
        store = %config.store_path.display(),
        source = %config.source_url,
        "configuration loaded"
    );

    let state = AppState::new(config).map_err(|source| MainError::BuildClient { source })?;
    let state = Arc::new(state);

    let poller = poller::spawn(state.clone());

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| MainError::TcpListenerBind { source })?;

    info!("Server running on addr: {}", addr);

    serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| MainError::Serve { source })?;

    poller.abort();
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
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
}
