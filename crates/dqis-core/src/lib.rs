//! Data Quality Intelligence Library
//!
//! Automated quality assessment for uploaded tabular datasets, built on
//! Polars.
//!
//! # Overview
//!
//! One run takes a single uploaded file and produces:
//!
//! - **Missing values**: empty cells across every column
//! - **Duplicate rows**: exact repeats, counted and then removed
//! - **Anomalies**: rows an isolation forest flags on the numeric columns
//! - **Quality score**: `(rows - missing - anomalies) / rows * 100`
//! - **Report**: render model for a page plus a downloadable text artifact
//!
//! Runs are synchronous, independent and hold no state between uploads.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dqis_core::{Pipeline, ReportGenerator, Upload};
//!
//! let upload = Upload::from_path("data.csv")?;
//! let analysis = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(&upload)?;
//!
//! println!("{}", ReportGenerator::text_report(&analysis.report));
//! ```
//!
//! # Configuration
//!
//! The model settings are fixed for end users. Tests and embedding code can
//! override them through [`AnalysisConfig`]:
//!
//! ```rust,ignore
//! use dqis_core::AnalysisConfig;
//!
//! let config = AnalysisConfig::builder()
//!     .contamination(0.1)
//!     .random_seed(7)
//!     .n_estimators(50)
//!     .build()?;
//! ```
//!
//! # Web pages
//!
//! [`render_upload`] is the whole request handler a page needs: one
//! [`Upload`] in, one [`PageModel`] out, never an error.

pub mod anomaly;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod projection;
pub mod quality;
pub mod reporting;
pub mod utils;

// Re-exports for convenient access
pub use anomaly::{AnomalyDetector, AnomalyLabeler, IsolationForest, LabelledDataset};
pub use cleaner::{CleaningOutcome, DataCleaner};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use error::{QualityError, Result as QualityResult, ResultExt};
pub use loader::{DatasetLoader, FileFormat, Upload};
pub use pipeline::{
    Analysis, AnalysisStage, ClosureProgressReporter, Pipeline, PipelineBuilder, ProgressReporter,
    ProgressUpdate,
};
pub use projection::{NumericProjection, NumericProjector, ProjectedColumn};
pub use quality::{QualityLevel, QualityReport, QualityScorer};
pub use reporting::{
    BarChart, ChartBar, DownloadArtifact, ErrorView, JsonReport, PageModel, ReportGenerator,
    ReportView, TablePreview, render_upload,
};
pub use utils::{is_missing_marker, is_numeric_dtype, numeric_column_names};
