//! Web layer
//!
//! HTTP interface for the school page service. Handlers stay thin and
//! delegate to the service layer; every page request funnels through
//! [`crate::services::PageService`].

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::WebConfig;
use crate::services::PageService;

pub mod handlers;

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &WebConfig, page_service: Arc<PageService>) -> Result<Self> {
        let app = Self::create_router(AppState { page_service });
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

        Ok(Self { app, addr })
    }

    /// Create the router with all routes and middleware.
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            // Health check endpoint
            .route("/health", get(handlers::health_check))
            // The page pipeline
            .route("/api/school/:query", get(handlers::school_page))
            // Landing page and static assets
            .route("/", get(handlers::index))
            .route("/static/*path", get(handlers::serve_static_asset))
            // Middleware (applied in reverse order)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            // Shared state
            .with_state(state)
    }

    /// Start the web server
    pub async fn serve(self) -> Result<()> {
        info!("Web server listening on http://{}", self.addr);
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub page_service: Arc<PageService>,
}
