//! Progress reporting for the analysis pipeline.
//!
//! A run is synchronous and cannot be interrupted, so progress is the only
//! signal a caller gets while it is in flight.
//!
//! # Example
//!
//! ```rust,ignore
//! use dqis_core::Pipeline;
//!
//! let analysis = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(&upload)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    /// Parsing the uploaded file
    Loading,
    /// Dropping the index column, counting gaps and duplicates
    Cleaning,
    /// Building the numeric, mean-filled matrix
    Projection,
    /// Fitting the isolation forest and labelling rows
    AnomalyDetection,
    /// Computing the quality score
    Scoring,
    /// Assembling the run summary
    Reporting,
    /// Run finished successfully
    Complete,
    /// Run ended with an error
    Failed,
}

impl AnalysisStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Dataset",
            Self::Cleaning => "Cleaning Data",
            Self::Projection => "Selecting Numeric Columns",
            Self::AnomalyDetection => "Detecting Anomalies",
            Self::Scoring => "Scoring Quality",
            Self::Reporting => "Preparing Report",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the whole run spent in this stage (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.15,
            Self::Cleaning => 0.20,
            Self::Projection => 0.15,
            Self::AnomalyDetection => 0.35,
            Self::Scoring => 0.05,
            Self::Reporting => 0.10,
            Self::Complete => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Cleaning => 0.15,
            Self::Projection => 0.35,
            Self::AnomalyDetection => 0.50,
            Self::Scoring => 0.85,
            Self::Reporting => 0.90,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: AnalysisStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: AnalysisStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates during a run.
///
/// Implementations must be `Send + Sync`: a single pipeline is shared by
/// every request the web server handles.
pub trait ProgressReporter: Send + Sync {
    /// Called once at the start and end of every stage. Keep it cheap.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
