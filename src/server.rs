use crate::config::AppConfig;
use crate::render;
use crate::types::MapDocument;
use anyhow::Result;
use axum::{
    extract::State,
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

pub struct AppState {
    pub document: MapDocument,
    /// The page rendered from `document` at startup.
    pub page: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LayerSummary {
    name: String,
    size: usize,
}

pub fn router(document: MapDocument, page: String, site_dir: &Path) -> Router {
    let state = Arc::new(AppState { document, page });

    Router::new()
        .route("/", get(page_handler))
        .route("/api/document", get(document_handler))
        .route("/api/layers", get(layers_handler))
        .fallback_service(ServeDir::new(site_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves a page rendered from `document` at `/`, the document itself under
/// `/api`, and any other file next to the configured HTML output.
pub async fn start_server(config: AppConfig, document: MapDocument) -> Result<()> {
    let site_dir = config
        .output
        .html
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let page = render::render_html(&document, render::page_title(&config.output))?;
    let app = router(document, page, &site_dir);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server.port));
    info!(%addr, site = ?site_dir, "starting server");
    println!("Map available at http://{}/", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn page_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.page.clone())
}

async fn document_handler(State(state): State<Arc<AppState>>) -> Json<MapDocument> {
    Json(state.document.clone())
}

async fn layers_handler(State(state): State<Arc<AppState>>) -> Json<Vec<LayerSummary>> {
    Json(
        state
            .document
            .overlays
            .iter()
            .map(|layer| LayerSummary {
                name: layer.name.clone(),
                size: layer.len(),
            })
            .collect(),
    )
}
