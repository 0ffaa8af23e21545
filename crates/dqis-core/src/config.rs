//! Configuration types for the data quality pipeline.
//!
//! The quality thresholds and report layout are fixed constants. The anomaly
//! model's hyperparameters live on [`AnalysisConfig`] so tests and embedding
//! code can override them; the user-facing surfaces never expose them.

use serde::{Deserialize, Serialize};

/// Expected share of outlier rows configured into the isolation forest.
pub const DEFAULT_CONTAMINATION: f64 = 0.05;

/// Seed for the isolation forest so repeated runs label rows identically.
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Number of isolation trees.
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Upper bound on the rows each tree is grown from.
pub const DEFAULT_MAX_SAMPLES: usize = 256;

/// Rows shown in the dataset preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Scores at or above this are "excellent".
pub const EXCELLENT_THRESHOLD: f64 = 90.0;

/// Scores at or above this (and below [`EXCELLENT_THRESHOLD`]) are "moderate".
pub const MODERATE_THRESHOLD: f64 = 75.0;

/// Name of the label column appended to the cleaned dataset.
pub const ANOMALY_COLUMN: &str = "anomaly";

/// File name of the downloadable text report.
pub const REPORT_FILE_NAME: &str = "data_quality_report.txt";

/// MIME type of the downloadable text report.
pub const REPORT_MIME_TYPE: &str = "text/plain";

/// Configuration for a data quality run.
///
/// Use [`AnalysisConfig::builder()`] to override individual settings.
///
/// # Example
///
/// ```rust,ignore
/// use dqis_core::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .random_seed(7)
///     .n_estimators(50)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Expected proportion of anomalous rows (0.0 - 0.5].
    /// Default: 0.05
    pub contamination: f64,

    /// Seed for the isolation forest's random number generator.
    /// Default: 42
    pub random_seed: u64,

    /// Number of trees in the isolation forest.
    /// Default: 100
    pub n_estimators: usize,

    /// Maximum number of rows each tree is grown from.
    /// Default: 256
    pub max_samples: usize,

    /// Number of raw rows included in the preview.
    /// Default: 5
    pub preview_rows: usize,

    /// Whether to drop a leftover positional index column before analysis.
    /// Default: true
    pub drop_index_column: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            contamination: DEFAULT_CONTAMINATION,
            random_seed: DEFAULT_RANDOM_SEED,
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_samples: DEFAULT_MAX_SAMPLES,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            drop_index_column: true,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(ConfigValidationError::InvalidContamination(
                self.contamination,
            ));
        }

        if self.n_estimators == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "n_estimators".to_string(),
                value: self.n_estimators,
            });
        }

        if self.max_samples == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "max_samples".to_string(),
                value: self.max_samples,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid contamination: {0} (must be in (0.0, 0.5])")]
    InvalidContamination(f64),

    #[error("Invalid value for '{field}': {value} (must be at least 1)")]
    InvalidCount { field: String, value: usize },
}

impl From<ConfigValidationError> for crate::error::QualityError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::QualityError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    contamination: Option<f64>,
    random_seed: Option<u64>,
    n_estimators: Option<usize>,
    max_samples: Option<usize>,
    preview_rows: Option<usize>,
    drop_index_column: Option<bool>,
}

impl AnalysisConfigBuilder {
    /// Set the expected proportion of anomalous rows.
    pub fn contamination(mut self, contamination: f64) -> Self {
        self.contamination = Some(contamination);
        self
    }

    /// Set the isolation forest seed.
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Set the number of isolation trees.
    pub fn n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = Some(n);
        self
    }

    /// Set the per-tree subsample ceiling.
    pub fn max_samples(mut self, n: usize) -> Self {
        self.max_samples = Some(n);
        self
    }

    /// Set the number of preview rows.
    pub fn preview_rows(mut self, n: usize) -> Self {
        self.preview_rows = Some(n);
        self
    }

    /// Enable or disable dropping a leftover index column.
    pub fn drop_index_column(mut self, drop: bool) -> Self {
        self.drop_index_column = Some(drop);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let config = AnalysisConfig {
            contamination: self.contamination.unwrap_or(DEFAULT_CONTAMINATION),
            random_seed: self.random_seed.unwrap_or(DEFAULT_RANDOM_SEED),
            n_estimators: self.n_estimators.unwrap_or(DEFAULT_N_ESTIMATORS),
            max_samples: self.max_samples.unwrap_or(DEFAULT_MAX_SAMPLES),
            preview_rows: self.preview_rows.unwrap_or(DEFAULT_PREVIEW_ROWS),
            drop_index_column: self.drop_index_column.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}
