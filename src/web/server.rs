//! Web server for dependency graph visualization
//!
//! Provides an HTTP server using Axum to serve the visualization UI
//! and the JSON graph endpoint.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::source::MetadataSource;

use super::routes;

/// Shared application state
pub struct AppState {
    /// Queried afresh on every graph request
    pub source: Arc<dyn MetadataSource>,
    pub api_endpoint: Option<String>,
}

/// Configuration for the web server
pub struct ServerConfig {
    pub port: u16,
    pub open_browser: bool,
    pub api_endpoint: Option<String>,
    /// Shown in the startup log only; the source already knows its root
    pub project_root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            open_browser: true,
            api_endpoint: None,
            project_root: PathBuf::from("."),
        }
    }
}

/// Build the application router
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .merge(routes::api_routes())
        .merge(routes::static_routes())
        .layer(cors)
        .with_state(state)
}

/// Start the web server and serve the visualization
pub async fn start_server(
    source: Arc<dyn MetadataSource>,
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = Arc::new(AppState {
        source,
        api_endpoint: config.api_endpoint.clone(),
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;

    let url = format!("http://localhost:{}", config.port);
    info!(
        "DepScope running at {} for {}",
        url,
        config.project_root.display()
    );

    if config.open_browser {
        info!("Opening browser...");
        if let Err(e) = open::that(&url) {
            warn!("Could not open browser: {}", e);
            warn!("Please open {} manually", url);
        }
    }

    info!("Press Ctrl+C to stop the server");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
