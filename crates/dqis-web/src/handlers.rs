//! HTTP handlers

use crate::AppState;
use crate::error::{Result, WebError};
use axum::{
    Json,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use dqis_core::{PageModel, ReportGenerator, Upload, render_upload};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Multipart field carrying the uploaded dataset.
pub const FILE_FIELD: &str = "file";

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    Ok(Html(state.renderer.render(None)?))
}

/// Upload form target. Every analysis outcome renders as a page; only a
/// broken request body falls through to an error response.
pub async fn analyze_page(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Html<String>> {
    let page = match read_upload(multipart).await {
        Ok(upload) => analyze_upload(state.clone(), upload).await?,
        Err(WebError::MissingFile) => return Ok(Html(state.renderer.render(None)?)),
        Err(e) => return Err(e),
    };

    Ok(Html(state.renderer.render(Some(&page))?))
}

pub async fn analyze_json(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<PageModel>> {
    let upload = read_upload(multipart).await?;
    let page = analyze_upload(state, upload).await?;
    Ok(Json(page))
}

/// Run the pipeline and return the text report as a file download.
pub async fn download_report(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response> {
    let upload = read_upload(multipart).await?;
    let analysis = run_blocking(state, move |state| state.pipeline.run(&upload)).await??;

    info!(
        rows = analysis.labelled.data.height(),
        anomalies = analysis.report.anomalies,
        "Report generated"
    );
    let artifact = ReportGenerator::build_view(&analysis).download;

    let headers = [
        (
            header::CONTENT_TYPE,
            format!("{}; charset=utf-8", artifact.mime_type),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.file_name),
        ),
    ];

    Ok((StatusCode::OK, headers, artifact.content).into_response())
}

pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "code": "NOT_FOUND", "message": "Not found" })),
    )
        .into_response()
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::Multipart(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| WebError::Multipart(e.body_text()))?;

        if file_name.is_empty() && bytes.is_empty() {
            // Browsers send an empty part when no file was chosen
            return Err(WebError::MissingFile);
        }

        info!(file = %file_name, bytes = bytes.len(), "Received upload");
        return Ok(Upload::new(file_name, bytes.to_vec()));
    }

    Err(WebError::MissingFile)
}

async fn analyze_upload(state: Arc<AppState>, upload: Upload) -> Result<PageModel> {
    let page = run_blocking(state, move |state| render_upload(&state.pipeline, &upload)).await?;

    if let Some(error) = &page.error {
        warn!(file = %page.file_name, code = %error.code, "Upload could not be analysed");
    }

    Ok(page)
}

/// Analysis is CPU bound; keep it off the async workers.
async fn run_blocking<T, F>(state: Arc<AppState>, f: F) -> Result<T>
where
    F: FnOnce(&AppState) -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| WebError::Internal(e.to_string()))
}
