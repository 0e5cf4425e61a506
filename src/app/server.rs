use crate::adapters::http::{build_router, AppState};
use crate::adapters::jsonl_store::JsonlStore;
use crate::adapters::memory_store::MemoryStore;
use crate::config::{IntakeConfig, StoreBackend, StoreConfig};
use crate::core::intake::IntakeService;
use crate::domain::ports::MessageStore;
use crate::utils::error::{AppError, Result};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn MessageStore>> {
    let store: Arc<dyn MessageStore> = match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("⚠️ Using in-memory store; messages are lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Jsonl => Arc::new(JsonlStore::open(&config.data_file).await?),
    };
    Ok(store)
}

pub fn build_app(config: &IntakeConfig, store: Arc<dyn MessageStore>) -> Router {
    let intake = IntakeService::new(store);
    build_router(AppState::new(intake), config.server.body_limit_bytes)
}

/// Serve until `shutdown` resolves, then let in-flight requests finish.
pub async fn serve_with_shutdown<F>(config: IntakeConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.bind_addr()?;
    let store = open_store(&config.store).await?;
    let app = build_app(&config, store);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🚀 contact-intake listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::ServerError {
            message: e.to_string(),
        })?;

    tracing::info!("👋 contact-intake stopped");
    Ok(())
}

pub async fn serve(config: IntakeConfig) -> Result<()> {
    serve_with_shutdown(config, wait_for_shutdown_signal()).await
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (Ok(mut sigterm), Ok(mut sigint)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) else {
            tracing::warn!("⚠️ Could not register signal handlers, falling back to Ctrl-C");
            let _ = tokio::signal::ctrl_c().await;
            return;
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
