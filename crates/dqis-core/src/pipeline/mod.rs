//! Pipeline module.
//!
//! Orchestrates one analysis run: load, clean, project, detect, score.

mod builder;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use progress::{AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};

use crate::anomaly::LabelledDataset;
use crate::cleaner::CleaningOutcome;
use crate::projection::ProjectedColumn;
use crate::quality::QualityReport;
use crate::reporting::TablePreview;

/// Everything one successful run produced.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// First rows of the dataset as uploaded.
    pub preview: TablePreview,
    /// (rows, columns) as uploaded.
    pub shape_before: (usize, usize),
    pub cleaning: CleaningOutcome,
    /// Columns the model was fitted on, with their fill means.
    pub numeric_columns: Vec<ProjectedColumn>,
    pub imputed_cells: usize,
    /// Cleaned dataset with its `anomaly` column.
    pub labelled: LabelledDataset,
    pub report: QualityReport,
    pub duration_ms: u64,
}

impl Analysis {
    /// (rows, columns) of the labelled dataset.
    pub fn shape_after(&self) -> (usize, usize) {
        self.labelled.data.shape()
    }

    pub fn numeric_column_names(&self) -> Vec<String> {
        self.numeric_columns.iter().map(|c| c.name.clone()).collect()
    }
}
