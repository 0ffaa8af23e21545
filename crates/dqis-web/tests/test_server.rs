//! Route tests driven through the router without binding a socket.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use dqis_core::Pipeline;
use dqis_web::{AppState, ServerConfig, create_router};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "dqis-test-boundary";

const READINGS_CSV: &str = "station,temperature,humidity\n\
north,20.1,40\nnorth,20.4,41\nsouth,21.0,43\nsouth,20.8,42\n\
east,19.9,39\neast,20.2,40\nwest,20.6,44\nwest,85.0,3\n";

// ============================================================================
// Helpers
// ============================================================================

fn app() -> Router {
    app_with_limit(ServerConfig::default().max_upload_bytes)
}

fn app_with_limit(max_upload_bytes: usize) -> Router {
    let config = ServerConfig {
        max_upload_bytes,
        ..ServerConfig::default()
    };
    let state = Arc::new(AppState::new(Pipeline::default()).unwrap());
    create_router(state, &config)
}

fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(uri: &str, field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, file_name, content)))
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

// ============================================================================
// Basic routes
// ============================================================================

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_index_page() {
    let response = app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("AI-Based Data Quality Intelligence System"));
    assert!(html.contains("Upload a CSV or Excel file to begin the analysis."));
    assert!(html.contains("name=\"file\""));
}

#[tokio::test]
async fn test_unknown_route() {
    let response = app()
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

// ============================================================================
// Analysis
// ============================================================================

#[tokio::test]
async fn test_analyze_json_success() {
    let response = app()
        .oneshot(upload_request(
            "/api/analyze",
            "file",
            "readings.csv",
            READINGS_CSV.as_bytes(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["file_name"], "readings.csv");
    assert!(json["error"].is_null());
    assert_eq!(json["preview"]["total_rows"], 8);
    assert_eq!(json["report"]["missing_values"], 0);
    assert_eq!(json["report"]["duplicate_rows"], 0);
    assert_eq!(json["report"]["download"]["file_name"], "data_quality_report.txt");
}

#[tokio::test]
async fn test_analyze_json_reports_data_errors_in_page() {
    let response = app()
        .oneshot(upload_request(
            "/api/analyze",
            "file",
            "names.csv",
            b"name\nada\ngrace\n",
        ))
        .await
        .unwrap();

    // The page model carries the error; the request itself succeeded
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NO_NUMERIC_COLUMNS");
    assert!(json["report"].is_null());
    assert_eq!(json["preview"]["rows"][1][0], "grace");
}

#[tokio::test]
async fn test_analyze_without_file_field() {
    let response = app()
        .oneshot(upload_request(
            "/api/analyze",
            "other",
            "readings.csv",
            READINGS_CSV.as_bytes(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "MISSING_FILE");
}

#[tokio::test]
async fn test_analyze_page_renders_report() {
    let response = app()
        .oneshot(upload_request(
            "/analyze",
            "file",
            "readings.csv",
            READINGS_CSV.as_bytes(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Dataset Preview"));
    assert!(html.contains("Quality Score Analysis"));
    assert!(html.contains("Anomaly Detection Visualization"));
    assert!(html.contains("Download Report"));
}

#[tokio::test]
async fn test_analyze_page_unsupported_format() {
    let response = app()
        .oneshot(upload_request("/analyze", "file", "notes.txt", b"hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("class=\"error\""));
    assert!(!html.contains("Dataset Preview"));
}

// ============================================================================
// Report download
// ============================================================================

#[tokio::test]
async fn test_report_download_headers() {
    let response = app()
        .oneshot(upload_request(
            "/api/report",
            "file",
            "readings.csv",
            READINGS_CSV.as_bytes(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"data_quality_report.txt\""
    );

    let text = body_string(response).await;
    assert!(text.starts_with("AI-Based Data Quality Report\n\nMissing Values: 0\n"));
    assert!(text.ends_with("Thank you for using the Data Quality Intelligence System!\n"));
}

#[tokio::test]
async fn test_report_download_data_error() {
    let response = app()
        .oneshot(upload_request(
            "/api/report",
            "file",
            "names.csv",
            b"name\nada\ngrace\n",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NO_NUMERIC_COLUMNS");
    assert_eq!(
        json["message"],
        "No numeric columns found in the dataset. Cannot perform anomaly detection."
    );
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let response = app_with_limit(64)
        .oneshot(upload_request(
            "/api/analyze",
            "file",
            "readings.csv",
            READINGS_CSV.as_bytes(),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}
