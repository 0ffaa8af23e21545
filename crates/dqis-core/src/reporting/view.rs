//! Render models.
//!
//! Plain serialisable values describing what a front end shows for one run.
//! No formatting decisions are left to the renderer beyond layout.

use crate::error::{QualityError, Result};
use crate::quality::QualityLevel;
use crate::utils::format_cell;
use polars::prelude::*;
use serde::Serialize;

/// Header plus the first rows of a dataset, every cell as display text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Row count of the whole dataset.
    pub total_rows: usize,
    /// Column count of the whole dataset.
    pub total_columns: usize,
}

impl TablePreview {
    /// Take the first `limit` rows. Missing cells render as empty strings.
    pub fn from_frame(df: &DataFrame, limit: usize) -> Result<Self> {
        let head = df.head(Some(limit));
        let columns: Vec<String> = head
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut rows = vec![Vec::with_capacity(columns.len()); head.height()];
        for col in head.get_columns() {
            let series = col.as_materialized_series();
            for (idx, row) in rows.iter_mut().enumerate() {
                row.push(format_cell(&series.get(idx)?));
            }
        }

        Ok(Self {
            columns,
            rows,
            total_rows: df.height(),
            total_columns: df.width(),
        })
    }
}

/// One bar of the normal-vs-anomaly chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: String,
    pub count: usize,
    /// Height relative to the tallest bar, 0-100.
    pub height_percent: f64,
}

/// Bar chart comparing normal and anomalous row counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub y_label: String,
    pub bars: Vec<ChartBar>,
}

impl BarChart {
    pub fn anomaly_split(normal: usize, anomalies: usize) -> Self {
        let tallest = normal.max(anomalies).max(1) as f64;
        let bar = |label: &str, count: usize| ChartBar {
            label: label.to_string(),
            count,
            height_percent: count as f64 / tallest * 100.0,
        };

        Self {
            title: "Anomaly Detection Result".to_string(),
            y_label: "Count".to_string(),
            bars: vec![bar("Normal", normal), bar("Anomaly", anomalies)],
        }
    }
}

/// A file offered for download.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub mime_type: String,
    pub content: String,
}

/// Everything shown for a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub missing_values: usize,
    pub duplicate_rows: usize,
    pub anomalies: usize,
    pub quality_score: f64,
    /// Score with two decimals, as printed in the artifact.
    pub score_display: String,
    pub level: QualityLevel,
    /// e.g. `Excellent Data Quality: 97.50%`
    pub verdict: String,
    pub chart: BarChart,
    pub numeric_columns: Vec<String>,
    pub download: DownloadArtifact,
}

/// A run failure as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorView {
    pub code: String,
    pub message: String,
}

impl From<&QualityError> for ErrorView {
    fn from(err: &QualityError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.user_message(),
        }
    }
}

/// Render model for one upload. The preview is present whenever the file
/// parsed; exactly one of `report` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageModel {
    pub file_name: String,
    pub preview: Option<TablePreview>,
    pub report: Option<ReportView>,
    pub error: Option<ErrorView>,
}

impl PageModel {
    pub fn is_success(&self) -> bool {
        self.report.is_some()
    }
}
