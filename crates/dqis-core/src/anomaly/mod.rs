//! Anomaly detection module
//!
//! Fits an outlier model on the numeric projection of a cleaned dataset and
//! appends one label per row: `1` for normal rows, `-1` for anomalies.

mod isolation_forest;

pub use isolation_forest::{IsolationForest, IsolationTree, average_path_length};

use crate::config::{ANOMALY_COLUMN, AnalysisConfig};
use crate::error::{QualityError, Result};
use crate::projection::NumericProjection;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Label given to rows the model isolates easily.
pub const ANOMALY_LABEL: i32 = -1;

/// Label given to every other row.
pub const NORMAL_LABEL: i32 = 1;

/// Anomaly detection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyResult {
    /// Anomaly scores (higher = more anomalous)
    pub scores: Array1<f64>,
    /// Labels (-1 = anomaly, 1 = normal)
    pub labels: Array1<i32>,
    /// Threshold used for classification
    pub threshold: f64,
    /// Number of anomalies detected
    pub n_anomalies: usize,
}

/// Trait for anomaly detectors
pub trait AnomalyDetector: Send + Sync {
    /// Fit the detector on training data
    fn fit(&mut self, x: &Array2<f64>) -> Result<()>;

    /// Compute anomaly scores for new data
    fn score_samples(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Predict labels (-1 = anomaly, 1 = normal)
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i32>>;

    /// Fit and predict in one step
    fn fit_predict(&mut self, x: &Array2<f64>) -> Result<Array1<i32>> {
        self.fit(x)?;
        self.predict(x)
    }

    /// Scores and labels together
    fn detect(&self, x: &Array2<f64>) -> Result<AnomalyResult> {
        let scores = self.score_samples(x)?;
        let labels = self.predict(x)?;
        let threshold = self.threshold();
        let n_anomalies = labels.iter().filter(|&&l| l == ANOMALY_LABEL).count();

        Ok(AnomalyResult {
            scores,
            labels,
            threshold,
            n_anomalies,
        })
    }

    /// Get the decision threshold
    fn threshold(&self) -> f64;
}

/// A dataset with its anomaly labels appended.
#[derive(Debug, Clone)]
pub struct LabelledDataset {
    /// Cleaned rows plus an Int32 `anomaly` column.
    pub data: DataFrame,
    /// Per-row labels, in row order.
    pub labels: Vec<i32>,
    /// Per-row anomaly scores, in row order.
    pub scores: Vec<f64>,
    /// Decision threshold of the fitted model.
    pub threshold: f64,
    /// Rows labelled `-1`.
    pub anomalies: usize,
    /// Rows labelled `1`.
    pub normal: usize,
}

/// Fits the isolation forest on a projection and labels the dataset.
#[derive(Debug, Clone)]
pub struct AnomalyLabeler {
    contamination: f64,
    random_seed: u64,
    n_estimators: usize,
    max_samples: usize,
}

impl Default for AnomalyLabeler {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl AnomalyLabeler {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            contamination: config.contamination,
            random_seed: config.random_seed,
            n_estimators: config.n_estimators,
            max_samples: config.max_samples,
        }
    }

    fn forest(&self) -> IsolationForest {
        IsolationForest::new()
            .with_n_estimators(self.n_estimators)
            .with_max_samples(self.max_samples)
            .with_contamination(self.contamination)
            .with_seed(self.random_seed)
    }

    /// Label every row of `df` using a model fitted on `projection`.
    ///
    /// The projection must have been built from `df`: rows are matched by
    /// position. The input frame is left untouched; an existing `anomaly`
    /// column is replaced in the returned frame.
    pub fn label(&self, df: &DataFrame, projection: &NumericProjection) -> Result<LabelledDataset> {
        if projection.n_rows() != df.height() {
            return Err(QualityError::ModelFit(format!(
                "projection has {} rows but the dataset has {}",
                projection.n_rows(),
                df.height()
            )));
        }

        info!(
            "Fitting isolation forest on {} rows x {} columns (contamination {})",
            projection.n_rows(),
            projection.n_columns(),
            self.contamination
        );

        let mut forest = self.forest();
        forest.fit(&projection.matrix)?;
        let result = forest.detect(&projection.matrix)?;

        let labels = result.labels.to_vec();
        let anomalies = result.n_anomalies;
        let normal = labels.len() - anomalies;
        debug!(
            "Decision threshold {:.6}: {} anomalies, {} normal",
            result.threshold, anomalies, normal
        );

        let mut data = df.clone();
        data.with_column(Series::new(ANOMALY_COLUMN.into(), labels.as_slice()))?;

        info!("Detected {} anomalies", anomalies);

        Ok(LabelledDataset {
            data,
            labels,
            scores: result.scores.to_vec(),
            threshold: result.threshold,
            anomalies,
            normal,
        })
    }
}
