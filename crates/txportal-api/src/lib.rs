//! HTTP API server for the transaction portal
//!
//! Routes are organized into modules:
//! - routes::providers: provider list and account catalogs
//! - routes::search: run one provider search
//! - routes::movements: filtered, paginated view of the last search
//! - routes::session: identity and logout

pub mod error;
pub mod extract;
pub mod routes;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use txportal_config::Config;
use txportal_core::providers::build_http_client;
use txportal_core::{
    AuthGate, CoreResult, DefaultErrorLogger, ErrorLogger, HttpTokenValidator, Portal, SearchSession,
};

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub portal: Arc<Portal>,
    pub auth: Arc<AuthGate>,
    /// Search sessions keyed by lowercased email
    pub sessions: Arc<RwLock<HashMap<String, SearchSession>>>,
    pub config: Arc<Config>,
    pub error_logger: Arc<dyn ErrorLogger>,
}

impl AppState {
    pub fn new(config: Config, portal: Portal, auth: AuthGate) -> Self {
        Self {
            portal: Arc::new(portal),
            auth: Arc::new(auth),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(config),
            error_logger: Arc::new(DefaultErrorLogger),
        }
    }

    /// Portal and auth gate wired from configuration
    pub fn from_config(config: Config) -> CoreResult<Self> {
        let portal = Portal::from_config(&config)?;

        let mut auth = AuthGate::new(config.auth.allowed_domain.clone());
        match &config.auth.token_validation_url {
            Some(url) => {
                let client = build_http_client(Duration::from_secs(config.http.timeout_secs))?;
                auth = auth.with_validator(Arc::new(HttpTokenValidator::new(client, url.clone())));
            }
            None => log::warn!(
                target: "txportal::api",
                "auth.token_validation_url is not set; authenticated routes will answer 503"
            ),
        }

        Ok(Self::new(config, portal, auth))
    }

    pub fn new_session(&self) -> SearchSession {
        SearchSession::new(self.portal.page_size())
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::movements::api_movements;
    use routes::providers::api_providers;
    use routes::search::api_search;
    use routes::session::{api_logout, api_me};

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/providers", get(api_providers))
        .route("/api/me", get(api_me))
        .route("/api/search", post(api_search))
        .route("/api/movements", get(api_movements))
        .route("/api/logout", post(api_logout))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Start the HTTP server and run until Ctrl-C
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_address();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!(target: "txportal::api", "Starting txportal server on http://{}", addr);
    log::info!(target: "txportal::api", "Available routes:");
    log::info!(target: "txportal::api", "  - GET  /api/health");
    log::info!(target: "txportal::api", "  - GET  /api/providers");
    log::info!(target: "txportal::api", "  - GET  /api/me");
    log::info!(target: "txportal::api", "  - POST /api/search");
    log::info!(target: "txportal::api", "  - GET  /api/movements?q=&page=");
    log::info!(target: "txportal::api", "  - POST /api/logout");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!(target: "txportal::api", "Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!(target: "txportal::api", "Failed to listen for shutdown signal: {}", e);
    }
}
