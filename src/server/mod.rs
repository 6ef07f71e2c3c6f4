//! HTTP surface: public catalog API, admin API and the ops hub

pub mod admin;
pub mod auth;
pub mod extract;
pub mod middleware;
pub mod public;
pub mod rate_limit;

use crate::config::{Config, StorageBackend};
use crate::core::operations::Storage;
use crate::imagegen::{HttpImageGenerator, ImageGenerator};
use crate::manager::{CatalogService, PatternService, PromptService, SessionService, WorkflowService};
use crate::storage::{JsonFileStore, MemoryStore};
use crate::utils::error::{AppError, AppResult};
use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
};
use rate_limit::RateLimiter;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Storage,
    pub prompts: PromptService,
    pub patterns: PatternService,
    pub workflows: WorkflowService,
    pub catalog: CatalogService,
    pub sessions: SessionService,
    pub rate_limiter: Arc<RateLimiter>,
    pub images: Arc<dyn ImageGenerator>,
}

impl AppState {
    pub fn new(config: Config, storage: Storage, images: Arc<dyn ImageGenerator>) -> Self {
        Self {
            prompts: PromptService::new(&storage),
            patterns: PatternService::new(&storage),
            workflows: WorkflowService::new(&storage),
            catalog: CatalogService::new(&storage),
            sessions: SessionService::new(&storage, config.auth.session_ttl_hours),
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit.clone())),
            config: Arc::new(config),
            storage,
            images,
        }
    }
}

/// Storage backend selected by `[storage]`
pub fn open_storage(config: &Config) -> Storage {
    match config.storage.backend {
        StorageBackend::File => Storage::new(Arc::new(JsonFileStore::new(config.storage.data_dir.clone()))),
        StorageBackend::Memory => Storage::new(Arc::new(MemoryStore::default())),
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(config.origin()) {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin = config.origin(), "base_url is not a valid origin, cross-origin requests disabled");
            cors
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public::router())
        .merge(admin::router())
        .merge(auth::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::canonicalize_prompt_slug,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_session_cookie,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

pub async fn serve(config: Config) -> AppResult<()> {
    config.validate()?;

    let storage = open_storage(&config);
    storage.ensure_ready().await?;

    let images: Arc<dyn ImageGenerator> = Arc::new(HttpImageGenerator::new(config.image.clone())?);
    let bind = config.server.bind.clone();
    let state = AppState::new(config, storage, images);

    match state.sessions.purge_expired().await {
        Ok(0) => {}
        Ok(purged) => tracing::info!(purged, "expired sessions removed"),
        Err(e) => tracing::warn!(error = %e, "could not purge expired sessions"),
    }

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|e| AppError::System(format!("Failed to bind {}: {}", bind, e)))?;
    tracing::info!("listening on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::System(format!("Server error: {}", e)))?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
