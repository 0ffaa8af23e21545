//! Web front end for the data quality analyser.
//!
//! A single page: upload a CSV or Excel file, see a preview, the quality
//! figures, an anomaly chart and a report download. The same analysis is
//! also exposed as JSON for scripts.
//!
//! | Route              | Response                                    |
//! |--------------------|---------------------------------------------|
//! | `GET /`            | empty upload page                           |
//! | `POST /analyze`    | page rendered for the uploaded `file` field |
//! | `POST /api/analyze`| the page model as JSON                      |
//! | `POST /api/report` | `data_quality_report.txt` as an attachment  |
//! | `GET /api/health`  | `{"status": "ok"}`                          |

pub mod config;
pub mod error;
pub mod handlers;
pub mod page;

pub use config::ServerConfig;
pub use error::WebError;
pub use page::PageRenderer;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use dqis_core::Pipeline;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared, read-only state. Each request runs its own analysis.
pub struct AppState {
    pub pipeline: Pipeline,
    pub renderer: PageRenderer,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> error::Result<Self> {
        Ok(Self {
            pipeline,
            renderer: PageRenderer::new()?,
        })
    }
}

pub fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/analyze", post(handlers::analyze_page))
        .route("/api/analyze", post(handlers::analyze_json))
        .route("/api/report", post(handlers::download_report))
        .route("/api/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn run_server(config: ServerConfig, pipeline: Pipeline) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(pipeline)?);
    let app = create_router(state, &config);

    let address = config.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install ctrl-c handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
