//! Integration tests for the data quality pipeline.
//!
//! These tests run whole uploads through the pipeline, from raw bytes to the
//! rendered report.

use dqis_core::config::{ANOMALY_COLUMN, REPORT_FILE_NAME, REPORT_MIME_TYPE};
use dqis_core::{
    AnalysisConfig, AnalysisStage, JsonReport, Pipeline, QualityError, QualityLevel,
    ReportGenerator, Upload, render_upload,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(filename: &str) -> Upload {
    Upload::from_path(fixtures_path().join(filename)).expect("Failed to read fixture")
}

fn run(filename: &str) -> dqis_core::QualityResult<dqis_core::Analysis> {
    Pipeline::default().run(&fixture(filename))
}

/// Workbook whose first column is an exported index with a blank header.
fn workbook_with_index(rows: u32) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.write_string(0, 1, "reading").unwrap();
    worksheet.write_string(0, 2, "site").unwrap();
    for row in 1..=rows {
        let idx = row - 1;
        worksheet.write_number(row, 0, idx as f64).unwrap();
        worksheet
            .write_number(row, 1, 10.0 + (idx % 5) as f64 * 0.5)
            .unwrap();
        worksheet
            .write_string(row, 2, if idx % 2 == 0 { "a" } else { "b" })
            .unwrap();
    }

    workbook.save_to_buffer().unwrap()
}

// ============================================================================
// CSV Uploads
// ============================================================================

#[test]
fn test_clean_dataset_flags_outlier() {
    let analysis = run("sensor_readings.csv").unwrap();

    assert_eq!(analysis.report.missing_values, 0);
    assert_eq!(analysis.report.duplicate_rows, 0);
    assert_eq!(analysis.labelled.data.height(), 40);

    // The last row is far away from every other reading
    assert_eq!(analysis.labelled.labels[39], -1);
    assert!((1..=3).contains(&analysis.report.anomalies));
    assert_eq!(analysis.report.level(), QualityLevel::Excellent);
    assert_eq!(
        analysis.numeric_column_names(),
        vec!["temperature".to_string(), "humidity".to_string()]
    );
}

#[test]
fn test_messy_dataset_counts() {
    let analysis = run("customers_messy.csv").unwrap();

    assert_eq!(analysis.cleaning.dropped_columns, vec!["Unnamed: 0"]);
    assert_eq!(analysis.report.missing_values, 4);
    assert_eq!(analysis.report.duplicate_rows, 2);
    assert_eq!(analysis.shape_before, (12, 4));
    // 10 rows, 3 columns + anomaly
    assert_eq!(analysis.shape_after(), (10, 4));

    let anomalies = analysis.report.anomalies;
    assert!(anomalies <= 2);
    let expected = (10.0 - (4 + anomalies) as f64) / 10.0 * 100.0;
    assert_eq!(analysis.report.quality_score, expected);
}

#[test]
fn test_preview_shows_raw_upload() {
    let analysis = run("customers_messy.csv").unwrap();

    // Taken before the index column is dropped
    assert_eq!(analysis.preview.columns[0], "Unnamed: 0");
    assert_eq!(analysis.preview.rows.len(), 5);
    assert_eq!(analysis.preview.rows[1][2], "");
    assert_eq!(analysis.preview.total_rows, 12);
}

#[test]
fn test_exported_index_with_blank_header() {
    let analysis = run("orders_exported.csv").unwrap();

    assert_eq!(
        analysis.preview.columns,
        vec!["Unnamed: 0", "quantity", "price", "Unnamed: 3", "region"]
    );
    // Only the leading index goes; the blank-headed text column is data
    assert_eq!(analysis.cleaning.dropped_columns, vec!["Unnamed: 0"]);
    assert!(analysis.cleaning.data.column("Unnamed: 3").is_ok());
    assert_eq!(analysis.report.missing_values, 2);
    assert_eq!(analysis.report.duplicate_rows, 1);
    assert_eq!(analysis.shape_after(), (5, 5));
    assert_eq!(
        analysis.numeric_column_names(),
        vec!["quantity".to_string(), "price".to_string()]
    );
}

#[test]
fn test_trailing_blank_header_is_kept() {
    let upload = Upload::new("trailing.csv", "a,b,\n1,2,\n3,4,5\n");
    let analysis = Pipeline::default().run(&upload).unwrap();

    assert_eq!(analysis.preview.columns, vec!["a", "b", "Unnamed: 2"]);
    assert!(analysis.cleaning.dropped_columns.is_empty());
    assert_eq!(analysis.report.missing_values, 1);
    assert_eq!(
        analysis.numeric_column_names(),
        vec!["a".to_string(), "b".to_string(), "Unnamed: 2".to_string()]
    );
}

#[test]
fn test_rows_with_separator_like_text_are_not_duplicates() {
    let upload = Upload::new(
        "notes.csv",
        "a,b,n\n\"x\u{1}vy\",z,1\nx,\"y\u{1}vz\",2\nx,\"y\u{1}vz\",2\n",
    );
    let analysis = Pipeline::default().run(&upload).unwrap();

    assert_eq!(analysis.report.duplicate_rows, 1);
    assert_eq!(analysis.labelled.data.height(), 2);
}

#[test]
fn test_anomaly_column_matches_labels() {
    let analysis = run("customers_messy.csv").unwrap();

    let column: Vec<Option<i32>> = analysis
        .labelled
        .data
        .column(ANOMALY_COLUMN)
        .unwrap()
        .i32()
        .unwrap()
        .into_iter()
        .collect();
    let labels: Vec<Option<i32>> = analysis.labelled.labels.iter().map(|l| Some(*l)).collect();

    assert_eq!(column, labels);
    let flagged = labels.iter().filter(|l| **l == Some(-1)).count();
    assert_eq!(flagged, analysis.report.anomalies);
}

#[test]
fn test_text_only_dataset_reports_fixed_message() {
    let err = run("names_only.csv").unwrap_err();

    assert_eq!(err.error_code(), "NO_NUMERIC_COLUMNS");
    assert_eq!(
        err.user_message(),
        "No numeric columns found in the dataset. Cannot perform anomaly detection."
    );
}

#[test]
fn test_header_only_dataset_is_empty() {
    let err = run("header_only.csv").unwrap_err();
    assert_eq!(err.error_code(), "EMPTY_DATASET");
}

#[test]
fn test_header_only_text_dataset_is_empty_not_non_numeric() {
    // No rows to score takes precedence over having no numeric columns
    let err = Pipeline::default()
        .run(&Upload::new("names.csv", "name,city\n"))
        .unwrap_err();
    assert_eq!(err.error_code(), "EMPTY_DATASET");
}

#[test]
fn test_all_missing_numeric_column() {
    let upload = Upload::new("gaps.csv", "a,b\n1,\n2,\n3,\n");
    let err = Pipeline::default().run(&upload).unwrap_err();

    assert_eq!(err.error_code(), "NO_VALID_VALUES");
    assert!(err.user_message().contains("'b'"));
}

#[test]
fn test_malformed_csv_is_parse_error() {
    let upload = Upload::new("broken.csv", "a,b\n1,2\n3,4,5,6,7\n");
    let err = Pipeline::default().run(&upload).unwrap_err();
    assert!(matches!(err, QualityError::Parse { .. }));
}

#[test]
fn test_repeated_runs_are_deterministic() {
    let first = run("sensor_readings.csv").unwrap();
    let second = run("sensor_readings.csv").unwrap();

    assert_eq!(first.labelled.labels, second.labelled.labels);
    assert_eq!(first.report, second.report);
}

#[test]
fn test_different_seed_still_finds_outlier() {
    let pipeline = Pipeline::builder()
        .config(AnalysisConfig::builder().random_seed(1234).build().unwrap())
        .build()
        .unwrap();

    let analysis = pipeline.run(&fixture("sensor_readings.csv")).unwrap();
    assert_eq!(analysis.labelled.labels[39], -1);
}

// ============================================================================
// Spreadsheet Uploads
// ============================================================================

#[test]
fn test_spreadsheet_upload() {
    let upload = Upload::new("readings.xlsx", workbook_with_index(20));
    let analysis = Pipeline::default().run(&upload).unwrap();

    assert_eq!(analysis.shape_before, (20, 3));
    assert_eq!(analysis.cleaning.dropped_columns, vec!["Unnamed: 0"]);
    // Without the index, readings repeat every 10 rows (5 values x 2 sites)
    assert_eq!(analysis.report.duplicate_rows, 10);
    assert_eq!(analysis.labelled.data.height(), 10);
    assert_eq!(analysis.numeric_column_names(), vec!["reading".to_string()]);
}

#[test]
fn test_spreadsheet_types() {
    let upload = Upload::new("readings.xlsx", workbook_with_index(6));
    let df = Pipeline::default().load(&upload).unwrap();

    assert_eq!(df.column("Unnamed: 0").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("reading").unwrap().dtype(), &DataType::Float64);
    assert_eq!(df.column("site").unwrap().dtype(), &DataType::String);
}

#[test]
fn test_garbage_spreadsheet_is_parse_error() {
    let upload = Upload::new("broken.xlsx", b"PK\x03\x04 not really a zip".to_vec());
    let err = Pipeline::default().run(&upload).unwrap_err();
    assert_eq!(err.error_code(), "PARSE_FAILED");
}

// ============================================================================
// Reports
// ============================================================================

#[test]
fn test_artifact_matches_rendered_figures() {
    let analysis = run("customers_messy.csv").unwrap();
    let view = ReportGenerator::build_view(&analysis);

    assert_eq!(view.download.file_name, REPORT_FILE_NAME);
    assert_eq!(view.download.mime_type, REPORT_MIME_TYPE);

    let expected = format!(
        "AI-Based Data Quality Report\n\
         \n\
         Missing Values: {}\n\
         Duplicate Rows: {}\n\
         Anomalies Detected: {}\n\
         Quality Score: {}%\n\
         \n\
         Thank you for using the Data Quality Intelligence System!\n",
        view.missing_values, view.duplicate_rows, view.anomalies, view.score_display
    );
    assert_eq!(view.download.content, expected);
    assert!(view.verdict.ends_with(&format!("{}%", view.score_display)));
}

#[test]
fn test_chart_counts_add_up() {
    let analysis = run("sensor_readings.csv").unwrap();
    let view = ReportGenerator::build_view(&analysis);

    let normal = &view.chart.bars[0];
    let anomaly = &view.chart.bars[1];
    assert_eq!(normal.label, "Normal");
    assert_eq!(anomaly.label, "Anomaly");
    assert_eq!(anomaly.count, view.anomalies);
    assert_eq!(normal.count + anomaly.count, 40);
}

#[test]
fn test_json_report_fields() {
    let analysis = run("customers_messy.csv").unwrap();
    let report = JsonReport::build("customers_messy.csv", &analysis);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["input_file"], "customers_messy.csv");
    assert_eq!(json["rows_before"], 12);
    assert_eq!(json["rows_after"], 10);
    assert_eq!(json["missing_values"], 4);
    assert_eq!(json["duplicate_rows"], 2);
    assert_eq!(json["dropped_columns"][0], "Unnamed: 0");
    assert_eq!(json["numeric_columns"][0]["name"], "age");
    assert!(json["generated_at"].is_string());
}

#[test]
fn test_emit_report_writes_text_artifact() {
    let analysis = run("sensor_readings.csv").unwrap();
    let dir = tempfile::tempdir().unwrap();

    let generator = ReportGenerator::new(dir.path());
    let path = generator.write_text_report(&analysis.report).unwrap();

    let written = std::fs::read_to_string(path).unwrap();
    assert_eq!(written, ReportGenerator::text_report(&analysis.report));
}

#[test]
fn test_render_upload_error_keeps_preview() {
    let page = render_upload(&Pipeline::default(), &fixture("names_only.csv"));

    assert!(!page.is_success());
    assert_eq!(page.preview.unwrap().rows.len(), 3);
    let error = page.error.unwrap();
    assert_eq!(error.code, "NO_NUMERIC_COLUMNS");
}

#[test]
fn test_render_upload_success() {
    let page = render_upload(&Pipeline::default(), &fixture("sensor_readings.csv"));

    assert!(page.error.is_none());
    let report = page.report.unwrap();
    assert!(report.verdict.starts_with("Excellent Data Quality: "));
}

// ============================================================================
// Progress Reporting
// ============================================================================

#[test]
fn test_progress_stages_in_order() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let stages_clone = stages.clone();

    let pipeline = Pipeline::builder()
        .on_progress(move |update| {
            let mut stages = stages_clone.lock().unwrap();
            if stages.last() != Some(&update.stage) {
                stages.push(update.stage);
            }
        })
        .build()
        .unwrap();

    pipeline.run(&fixture("sensor_readings.csv")).unwrap();

    let stages = stages.lock().unwrap();
    assert_eq!(
        *stages,
        vec![
            AnalysisStage::Loading,
            AnalysisStage::Cleaning,
            AnalysisStage::Projection,
            AnalysisStage::AnomalyDetection,
            AnalysisStage::Scoring,
            AnalysisStage::Reporting,
            AnalysisStage::Complete,
        ]
    );
}
