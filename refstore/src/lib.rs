//! Reference storage service.
//!
//! A minimal HTTP file-storage service: clients POST an image with `type` and
//! `featureId` query parameters, the service validates the request, writes the
//! bytes under a generated filename, and returns a reference path or URL. A
//! demo-only GET endpoint serves stored files back by path.
//!
//! The crate is split the usual way:
//! - [`config`] - YAML + environment configuration
//! - [`api`] - request/response models and axum handlers
//! - [`storage`] - local filesystem persistence
//! - [`errors`] - the service error type and its JSON rendering
//! - [`telemetry`] - tracing setup

pub mod api;
pub mod config;
pub mod errors;
mod openapi;
pub mod storage;
pub mod telemetry;

pub use config::Config;

use crate::openapi::ApiDoc;
use crate::storage::DiskStore;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Shared state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: DiskStore,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    if config.cors_allowed_origins.iter().any(|o| o == "*") {
        return Ok(CorsLayer::permissive());
    }

    let mut origins = Vec::new();
    for origin in &config.cors_allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    Ok(CorsLayer::new().allow_origin(origins))
}

/// Build the application router: storage API under the configured API base
/// path, demo retrieval under the demo base path, docs at `/docs`.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let upload_limit = state.config.max_upload_bytes as usize;

    let storage_routes = Router::new()
        .route("/v1/status", get(api::handlers::status::service_status))
        .route(
            "/v1/files",
            post(api::handlers::files::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state.clone());

    let demo_routes = Router::new()
        .route("/v1/files", get(api::handlers::files::download_file))
        .with_state(state.clone());

    let cors_layer = create_cors_layer(&state.config)?;

    let router = Router::new()
        .nest(&state.config.api_base_path, storage_routes)
        .nest(&state.config.demo_base_path, demo_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// The running application: a configured router plus the config it was built
/// from. Create with [`Application::new`], then either [`Application::serve`]
/// it or turn it into a test server.
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with the storage root prepared
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        tracing::debug!("Starting reference storage service with configuration: {:#?}", config);

        tokio::fs::create_dir_all(&config.storage_root).await?;

        let state = AppState {
            config: config.clone(),
            store: DiskStore::new(config.storage_root.clone()),
        };
        let router = build_router(state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Reference storage service listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Server stopped");
        Ok(())
    }
}
