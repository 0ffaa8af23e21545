//! Analysis pipeline and its builder.

use crate::anomaly::AnomalyLabeler;
use crate::cleaner::DataCleaner;
use crate::config::AnalysisConfig;
use crate::error::{QualityError, Result, ResultExt};
use crate::loader::{DatasetLoader, Upload};
use crate::pipeline::Analysis;
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::projection::NumericProjector;
use crate::quality::QualityReport;
use crate::reporting::TablePreview;
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Runs the load, clean, project, detect and score stages for one upload.
///
/// A pipeline holds only immutable configuration, so one instance can serve
/// any number of independent runs.
///
/// # Example
///
/// ```rust,ignore
/// use dqis_core::{AnalysisConfig, Pipeline, Upload};
///
/// let pipeline = Pipeline::builder()
///     .config(AnalysisConfig::builder().random_seed(7).build()?)
///     .build()?;
///
/// let analysis = pipeline.run(&Upload::from_path("sales.csv")?)?;
/// println!("score: {:.2}", analysis.report.quality_score);
/// ```
pub struct Pipeline {
    config: AnalysisConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: DataCleaner,
    labeler: AnomalyLabeler,
}

// The web server shares one pipeline across request handlers
static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Default for Pipeline {
    fn default() -> Self {
        Self::with_config(AnalysisConfig::default())
    }
}

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    fn with_config(config: AnalysisConfig) -> Self {
        Self {
            cleaner: DataCleaner::new(config.drop_index_column),
            labeler: AnomalyLabeler::from_config(&config),
            config,
            progress_reporter: None,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Parse an upload into a dataset.
    pub fn load(&self, upload: &Upload) -> Result<DataFrame> {
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Loading,
            0.0,
            format!("Reading {}...", upload.file_name),
        ));

        match DatasetLoader::load(upload) {
            Ok(df) => {
                self.report_progress(ProgressUpdate::new(
                    AnalysisStage::Loading,
                    1.0,
                    format!("Loaded {} rows x {} columns", df.height(), df.width()),
                ));
                Ok(df)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Analyse a loaded dataset. Every stage runs once, in order; the first
    /// error ends the run.
    pub fn analyze(&self, df: DataFrame) -> Result<Analysis> {
        match self.analyze_internal(df) {
            Ok(analysis) => {
                self.report_progress(ProgressUpdate::complete("Analysis completed successfully"));
                Ok(analysis)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Load and analyse an upload.
    pub fn run(&self, upload: &Upload) -> Result<Analysis> {
        let df = self.load(upload)?;
        self.analyze(df)
    }

    fn fail(&self, e: QualityError) -> QualityError {
        error!("Analysis error: {}", e);
        self.report_progress(ProgressUpdate::failed(e.user_message()));
        e
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn analyze_internal(&self, df: DataFrame) -> Result<Analysis> {
        let start_time = Instant::now();
        let shape_before = df.shape();

        info!("Starting analysis of {:?} dataset...", shape_before);

        let preview = TablePreview::from_frame(&df, self.config.preview_rows)?;

        // Step 1: Clean
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            0.0,
            "Removing index column and duplicate rows...",
        ));
        info!("Step 1: Cleaning dataset...");
        let cleaning = self.cleaner.clean(&df).context("Cleaning")?;
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            1.0,
            format!(
                "{} missing values, {} duplicate rows",
                cleaning.missing_values, cleaning.duplicate_rows
            ),
        ));

        if cleaning.data.height() == 0 {
            return Err(QualityError::EmptyDataset);
        }

        // Step 2: Numeric projection
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Projection,
            0.0,
            "Selecting numeric columns...",
        ));
        info!("Step 2: Projecting numeric columns...");
        let projection = NumericProjector::project(&cleaning.data).context("Projection")?;
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Projection,
            1.0,
            format!("{} numeric columns selected", projection.n_columns()),
        ));

        // Step 3: Anomaly detection
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::AnomalyDetection,
            0.0,
            "Fitting isolation forest...",
        ));
        info!("Step 3: Detecting anomalies...");
        let labelled = self
            .labeler
            .label(&cleaning.data, &projection)
            .context("Anomaly detection")?;
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::AnomalyDetection,
            1.0,
            format!("{} anomalies detected", labelled.anomalies),
        ));

        // Step 4: Score
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Scoring,
            0.0,
            "Computing quality score...",
        ));
        info!("Step 4: Scoring...");
        let report = QualityReport::new(
            labelled.data.height(),
            cleaning.missing_values,
            cleaning.duplicate_rows,
            labelled.anomalies,
        )?;
        info!(
            "Quality score {:.2}% ({})",
            report.quality_score,
            report.level()
        );

        // Step 5: Summary
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Reporting,
            0.0,
            "Preparing report...",
        ));
        let analysis = Analysis {
            preview,
            shape_before,
            numeric_columns: projection.summary(),
            imputed_cells: projection.imputed_cells,
            cleaning,
            labelled,
            report,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        info!("Analysis complete in {} ms", analysis.duration_ms);
        Ok(analysis)
    }
}

/// Builder for creating a configured [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<AnalysisConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the analysis configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during a run.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Validate the configuration and build the pipeline.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let mut pipeline = Pipeline::with_config(config);
        pipeline.progress_reporter = self.progress_reporter;
        Ok(pipeline)
    }
}
