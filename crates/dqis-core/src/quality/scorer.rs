use crate::config::{EXCELLENT_THRESHOLD, MODERATE_THRESHOLD};
use crate::error::{QualityError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Presentation band of a quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Excellent,
    Moderate,
    Poor,
}

impl QualityLevel {
    /// Band for an unrounded score: `>= 90` excellent, `>= 75` moderate,
    /// anything lower poor.
    pub fn classify(score: f64) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            QualityLevel::Excellent
        } else if score >= MODERATE_THRESHOLD {
            QualityLevel::Moderate
        } else {
            QualityLevel::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityLevel::Excellent => "Excellent",
            QualityLevel::Moderate => "Moderate",
            QualityLevel::Poor => "Poor",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The four figures of one run. Both the on-screen summary and the
/// downloadable artifact are rendered from this value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub missing_values: usize,
    /// Duplicates found before removal.
    pub duplicate_rows: usize,
    pub anomalies: usize,
    /// Percentage; negative when errors outnumber rows.
    pub quality_score: f64,
}

impl QualityReport {
    /// Score the counts of a run and freeze them into a report.
    pub fn new(
        total_rows: usize,
        missing_values: usize,
        duplicate_rows: usize,
        anomalies: usize,
    ) -> Result<Self> {
        let quality_score = QualityScorer::score(total_rows, missing_values, anomalies)?;
        Ok(Self {
            missing_values,
            duplicate_rows,
            anomalies,
            quality_score,
        })
    }

    pub fn level(&self) -> QualityLevel {
        QualityLevel::classify(self.quality_score)
    }
}

/// Combines missing-cell and anomaly counts into a percentage.
pub struct QualityScorer;

impl QualityScorer {
    /// `(total_rows - (missing + anomalies)) / total_rows * 100`.
    ///
    /// Missing cells and anomalous rows are added without deduplication: a
    /// row that is both anomalous and has a gap counts twice. The result is
    /// not clamped.
    ///
    /// `total_rows` is the row count after duplicate removal.
    pub fn score(total_rows: usize, missing_values: usize, anomalies: usize) -> Result<f64> {
        if total_rows == 0 {
            return Err(QualityError::EmptyDataset);
        }

        let total = total_rows as f64;
        let errors = (missing_values + anomalies) as f64;
        Ok((total - errors) / total * 100.0)
    }
}
