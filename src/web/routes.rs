//! HTTP routes for the web visualization
//!
//! Provides the graph API endpoint and static file serving.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use rust_embed::RustEmbed;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::graph::{EdgeStatus, GraphBuilder};
use crate::serializer;

use super::server::AppState;

/// Embedded static assets
#[derive(RustEmbed)]
#[folder = "web-assets/"]
struct Assets;

/// Frontend configuration
#[derive(Serialize)]
struct FrontendConfig {
    api_endpoint: Option<String>,
}

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/graph", get(get_graph).fallback(method_not_allowed))
        .route("/api/config", get(get_config))
        .route("/api/health", get(health_check))
}

/// Create static file routes
pub fn static_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index_html))
        .route("/{*path}", get(static_handler))
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Method not allowed",
    )
        .into_response()
}

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message,
    )
        .into_response()
}

/// GET /api/graph - Builds and returns the module dependency graph
async fn get_graph(State(state): State<Arc<AppState>>) -> Response {
    let source = Arc::clone(&state.source);
    let built = tokio::task::spawn_blocking(move || {
        GraphBuilder::new(source.as_ref()).build_with_report()
    })
    .await;

    let report = match built {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            error!("Failed to parse dependencies: {}", e);
            return internal_error(format!("Failed to parse dependencies: {}", e));
        }
        Err(e) => {
            error!("Graph build task failed: {}", e);
            return internal_error(format!("Failed to parse dependencies: {}", e));
        }
    };

    if let EdgeStatus::Unavailable(reason) = &report.edges {
        warn!("Edge listing failed, serving graph without edges: {}", reason);
    }

    match serializer::serialize(&report.graph) {
        Ok(body) => {
            debug!(
                "Serving graph with {} nodes and {} edges",
                report.graph.node_count(),
                report.graph.edge_count()
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to marshal JSON: {}", e);
            internal_error(format!("Failed to marshal JSON: {}", e))
        }
    }
}

/// GET /api/config - Returns frontend configuration
async fn get_config(State(state): State<Arc<AppState>>) -> Json<FrontendConfig> {
    Json(FrontendConfig {
        api_endpoint: state.api_endpoint.clone(),
    })
}

/// GET /api/health - Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

/// GET / - Serve index.html
async fn index_html() -> impl IntoResponse {
    match Assets::get("index.html") {
        Some(content) => Html(content.data.into_owned()).into_response(),
        None => (StatusCode::NOT_FOUND, "index.html not found").into_response(),
    }
}

/// Static file handler for embedded assets
async fn static_handler(
    axum::extract::Path(path): axum::extract::Path<String>,
) -> impl IntoResponse {
    let path = path.trim_start_matches('/');

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, format!("File not found: {}", path)).into_response(),
    }
}
