pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use srs_core::{CatalogItem, ReviewEngine};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::services::{saver, storage::FileStorage};

pub type Engine = ReviewEngine<CatalogItem>;

/// The engine is single-caller; requests take turns through the mutex.
pub type SharedEngine = Arc<Mutex<Engine>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: SharedEngine,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Lock the engine for one request. Never hold the guard across an await.
    pub fn engine(&self) -> Result<MutexGuard<'_, Engine>, ApiError> {
        self.engine
            .lock()
            .map_err(|_| ApiError::Internal("engine lock poisoned".to_string()))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/study/queue", get(routes::study::queue))
        .route("/api/study/review", post(routes::study::review))
        .route("/api/study/preview/:key", get(routes::study::preview))
        .route("/api/study/attempt", post(routes::study::attempt))
        .route(
            "/api/items/:key",
            get(routes::items::get_item).delete(routes::items::reset_item),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let storage = Arc::new(FileStorage::new(&config.data_dir));

    tracing::info!("Loading data from {}", storage.data_dir().display());
    let catalog = storage.load_catalog().await.context("failed to load catalog")?;
    let history = storage.load_history().await.context("failed to load history")?;
    tracing::info!(
        items = catalog.len(),
        histories = history.len(),
        algorithm = %config.scheduler.algorithm,
        "Data loaded"
    );

    let (notifier, rx) = saver::channel();
    let engine = ReviewEngine::init(catalog, history)
        .with_config(config.scheduler.clone())?
        .with_notifier(notifier);
    let state = AppState::new(engine);
    let saver = saver::spawn_saver(
        &state.engine,
        Arc::clone(&storage),
        rx,
        saver::SaveSchedule {
            debounce: config.save_debounce,
            max_wait: config.save_max_wait,
        },
    );

    let app = build_router(state.clone())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush whatever the debounce window still holds.
    saver.abort();
    let snapshot = state.engine()?.store().clone();
    storage.save_history(&snapshot).await?;
    tracing::info!(entries = snapshot.len(), "Review history saved, shutting down");

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for ctrl+c: {}", e);
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
                tracing::warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
