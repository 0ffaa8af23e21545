use crate::config::{REPORT_FILE_NAME, REPORT_MIME_TYPE};
use crate::error::{QualityError, Result};
use crate::pipeline::Analysis;
use crate::projection::ProjectedColumn;
use crate::quality::{QualityLevel, QualityReport};
use crate::reporting::view::{BarChart, DownloadArtifact, ReportView};
use chrono::Local;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

// ============================================================================
// Machine-readable Report
// ============================================================================

/// Full machine-readable summary of one run.
///
/// Used for `--json` output and for the JSON file written by `--emit-report`.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Name of the analysed file
    pub input_file: String,

    pub rows_before: usize,
    pub columns_before: usize,
    /// Rows after duplicate removal
    pub rows_after: usize,
    /// Columns after cleaning, including the added `anomaly` column
    pub columns_after: usize,
    pub dropped_columns: Vec<String>,

    /// Columns the model was fitted on and their fill means
    pub numeric_columns: Vec<ProjectedColumn>,
    pub imputed_cells: usize,

    pub missing_values: usize,
    pub duplicate_rows: usize,
    pub anomalies: usize,
    pub normal_rows: usize,
    pub quality_score: f64,
    pub quality_level: QualityLevel,
    pub verdict: String,

    pub cleaning_actions: Vec<String>,
    pub duration_ms: u64,
}

impl JsonReport {
    pub fn build(input_file: impl Into<String>, analysis: &Analysis) -> Self {
        let (rows_before, columns_before) = analysis.shape_before;
        let (rows_after, columns_after) = analysis.shape_after();
        let report = &analysis.report;

        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.into(),
            rows_before,
            columns_before,
            rows_after,
            columns_after,
            dropped_columns: analysis.cleaning.dropped_columns.clone(),
            numeric_columns: analysis.numeric_columns.clone(),
            imputed_cells: analysis.imputed_cells,
            missing_values: report.missing_values,
            duplicate_rows: report.duplicate_rows,
            anomalies: report.anomalies,
            normal_rows: analysis.labelled.normal,
            quality_score: report.quality_score,
            quality_level: report.level(),
            verdict: ReportGenerator::verdict(report),
            cleaning_actions: analysis.cleaning.actions.clone(),
            duration_ms: analysis.duration_ms,
        }
    }
}

// ============================================================================
// Report Generator
// ============================================================================

/// Renders run results as text, render models and files.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Score with two decimals.
    pub fn format_score(score: f64) -> String {
        format!("{:.2}", score)
    }

    /// e.g. `Moderate Data Quality: 81.25%`
    pub fn verdict(report: &QualityReport) -> String {
        format!(
            "{} Data Quality: {}%",
            report.level().label(),
            Self::format_score(report.quality_score)
        )
    }

    /// The downloadable plain-text report.
    pub fn text_report(report: &QualityReport) -> String {
        format!(
            "AI-Based Data Quality Report\n\
             \n\
             Missing Values: {}\n\
             Duplicate Rows: {}\n\
             Anomalies Detected: {}\n\
             Quality Score: {}%\n\
             \n\
             Thank you for using the Data Quality Intelligence System!\n",
            report.missing_values,
            report.duplicate_rows,
            report.anomalies,
            Self::format_score(report.quality_score)
        )
    }

    /// Render model for a successful run. Figures and artifact both come
    /// from the same [`QualityReport`].
    pub fn build_view(analysis: &Analysis) -> ReportView {
        let report = &analysis.report;

        ReportView {
            missing_values: report.missing_values,
            duplicate_rows: report.duplicate_rows,
            anomalies: report.anomalies,
            quality_score: report.quality_score,
            score_display: Self::format_score(report.quality_score),
            level: report.level(),
            verdict: Self::verdict(report),
            chart: BarChart::anomaly_split(analysis.labelled.normal, analysis.labelled.anomalies),
            numeric_columns: analysis.numeric_column_names(),
            download: DownloadArtifact {
                file_name: REPORT_FILE_NAME.to_string(),
                mime_type: REPORT_MIME_TYPE.to_string(),
                content: Self::text_report(report),
            },
        }
    }

    /// Write the plain-text report into the output directory.
    pub fn write_text_report(&self, report: &QualityReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join(REPORT_FILE_NAME);
        let mut file = File::create(&path).map_err(|e| {
            QualityError::ReportGenerationFailed(format!("{}: {}", path.display(), e))
        })?;
        file.write_all(Self::text_report(report).as_bytes())?;

        info!("Report saved: {}", path.display());
        Ok(path)
    }

    /// Write the JSON report as `<base>_report.json` into the output directory.
    pub fn write_json_report(&self, report: &JsonReport, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join(format!("{}_report.json", base_name));
        let mut file = File::create(&path).map_err(|e| {
            QualityError::ReportGenerationFailed(format!("{}: {}", path.display(), e))
        })?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("JSON report saved: {}", path.display());
        Ok(path)
    }
}
