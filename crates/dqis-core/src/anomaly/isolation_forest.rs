//! Isolation Forest anomaly detection

use crate::anomaly::AnomalyDetector;
use crate::config::{DEFAULT_CONTAMINATION, DEFAULT_MAX_SAMPLES, DEFAULT_N_ESTIMATORS, DEFAULT_RANDOM_SEED};
use crate::error::{QualityError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand::seq::index;
use serde::{Deserialize, Serialize};

/// Euler-Mascheroni constant, used for the harmonic number approximation.
const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Isolation Tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IsolationTree {
    /// Internal node with split
    Internal {
        /// Feature index for split
        feature: usize,
        /// Split threshold
        threshold: f64,
        /// Left subtree (values <= threshold)
        left: Box<IsolationTree>,
        /// Right subtree (values > threshold)
        right: Box<IsolationTree>,
    },
    /// External (leaf) node
    External {
        /// Number of training samples that reached this node
        size: usize,
    },
}

impl IsolationTree {
    /// Build an isolation tree over the given row indices.
    pub fn build(
        x: &Array2<f64>,
        indices: &[usize],
        height: usize,
        max_height: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let n_samples = indices.len();

        if height >= max_height || n_samples <= 1 {
            return IsolationTree::External { size: n_samples };
        }

        // Only features that still vary inside this node can split it
        let candidates: Vec<(usize, f64, f64)> = (0..x.ncols())
            .filter_map(|feature| {
                let (min_val, max_val) = indices.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), &i| (lo.min(x[[i, feature]]), hi.max(x[[i, feature]])),
                );
                (max_val > min_val).then_some((feature, min_val, max_val))
            })
            .collect();

        let Some(&(feature, min_val, max_val)) = candidates.choose(rng) else {
            return IsolationTree::External { size: n_samples };
        };

        let threshold = rng.gen_range(min_val..max_val);

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature]] <= threshold);

        if left_indices.is_empty() || right_indices.is_empty() {
            return IsolationTree::External { size: n_samples };
        }

        let left = Box::new(Self::build(x, &left_indices, height + 1, max_height, rng));
        let right = Box::new(Self::build(x, &right_indices, height + 1, max_height, rng));

        IsolationTree::Internal {
            feature,
            threshold,
            left,
            right,
        }
    }

    /// Path length of a sample: edges walked plus the expected remaining
    /// depth of the leaf it lands in.
    pub fn path_length(&self, sample: ArrayView1<f64>) -> f64 {
        let mut node = self;
        let mut depth = 0usize;
        loop {
            match node {
                IsolationTree::External { size } => {
                    return depth as f64 + average_path_length(*size);
                }
                IsolationTree::Internal {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                    depth += 1;
                }
            }
        }
    }
}

/// Average path length of an unsuccessful search in a binary search tree
/// of `n` nodes: `c(n) = 2 H(n-1) - 2(n-1)/n`.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n_f = n as f64;
            2.0 * ((n_f - 1.0).ln() + EULER_GAMMA) - 2.0 * (n_f - 1.0) / n_f
        }
    }
}

/// Linearly interpolated quantile `q` in `[0, 1]` of unsorted values.
fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Isolation Forest anomaly detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    /// Number of trees
    n_estimators: usize,
    /// Maximum samples per tree
    max_samples: usize,
    /// Expected proportion of outliers
    contamination: f64,
    /// Random seed
    seed: u64,
    /// Fitted trees
    trees: Option<Vec<IsolationTree>>,
    /// Scores strictly above this are anomalies
    threshold: Option<f64>,
    /// Rows each tree was grown on
    samples_per_tree: Option<usize>,
}

impl IsolationForest {
    pub fn new() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_samples: DEFAULT_MAX_SAMPLES,
            contamination: DEFAULT_CONTAMINATION,
            seed: DEFAULT_RANDOM_SEED,
            trees: None,
            threshold: None,
            samples_per_tree: None,
        }
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n.max(1);
        self
    }

    pub fn with_max_samples(mut self, n: usize) -> Self {
        self.max_samples = n.max(1);
        self
    }

    pub fn with_contamination(mut self, c: f64) -> Self {
        self.contamination = c.clamp(0.0, 0.5);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.trees.is_some()
    }

    /// Anomaly score in (0, 1]; higher means easier to isolate.
    fn compute_scores(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (trees, samples_per_tree) = match (&self.trees, self.samples_per_tree) {
            (Some(trees), Some(n)) => (trees, n),
            _ => return Err(QualityError::ModelFit("model is not fitted".to_string())),
        };

        let c_n = average_path_length(samples_per_tree).max(f64::MIN_POSITIVE);

        let scores = x
            .rows()
            .into_iter()
            .map(|row| {
                let avg_path_length = trees
                    .iter()
                    .map(|tree| tree.path_length(row))
                    .sum::<f64>()
                    / trees.len() as f64;

                // s(x, n) = 2^(-E[h(x)] / c(n))
                2.0_f64.powf(-avg_path_length / c_n)
            })
            .collect();

        Ok(Array1::from_vec(scores))
    }
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyDetector for IsolationForest {
    fn fit(&mut self, x: &Array2<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples < 2 {
            return Err(QualityError::ModelFit(format!(
                "at least 2 rows are required, got {}",
                n_samples
            )));
        }
        if x.ncols() == 0 {
            return Err(QualityError::ModelFit("no features to fit on".to_string()));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(QualityError::ModelFit(
                "input contains infinite or NaN values".to_string(),
            ));
        }

        let samples_per_tree = self.max_samples.min(n_samples);
        let max_height = (samples_per_tree.max(2) as f64).log2().ceil() as usize;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            // Subsample without replacement
            let indices = index::sample(&mut rng, n_samples, samples_per_tree).into_vec();
            trees.push(IsolationTree::build(x, &indices, 0, max_height, &mut rng));
        }

        self.trees = Some(trees);
        self.samples_per_tree = Some(samples_per_tree);

        let scores = self.compute_scores(x)?;
        let scores = scores.to_vec();
        self.threshold = Some(quantile(&scores, 1.0 - self.contamination));

        Ok(())
    }

    fn score_samples(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.compute_scores(x)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i32>> {
        let threshold = self
            .threshold
            .ok_or_else(|| QualityError::ModelFit("model is not fitted".to_string()))?;
        let scores = self.score_samples(x)?;

        Ok(scores.mapv(|s| if s > threshold { -1 } else { 1 }))
    }

    fn threshold(&self) -> f64 {
        self.threshold.unwrap_or(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clustered_with_outliers() -> Array2<f64> {
        // 60 points on a 10 x 6 grid plus two far-away points
        let mut data = Vec::new();
        for i in 0..60 {
            data.push((i % 10) as f64);
            data.push((i / 10) as f64);
        }
        data.extend_from_slice(&[100.0, 100.0]);
        data.extend_from_slice(&[-50.0, -50.0]);

        Array2::from_shape_vec((62, 2), data).unwrap()
    }

    #[test]
    fn test_outliers_are_flagged() {
        let x = clustered_with_outliers();

        let mut iforest = IsolationForest::new().with_seed(42);
        iforest.fit(&x).unwrap();

        let scores = iforest.score_samples(&x).unwrap();
        let labels = iforest.predict(&x).unwrap();

        assert!(scores[60] > scores[0]);
        assert!(scores[61] > scores[0]);
        assert_eq!(labels[60], -1);
        assert_eq!(labels[61], -1);

        let n_anomalies = labels.iter().filter(|&&l| l == -1).count();
        assert!(n_anomalies >= 2 && n_anomalies <= 6, "got {}", n_anomalies);
    }

    #[test]
    fn test_same_seed_same_labels() {
        let x = clustered_with_outliers();

        let mut a = IsolationForest::new().with_seed(7);
        let mut b = IsolationForest::new().with_seed(7);

        assert_eq!(a.fit_predict(&x).unwrap(), b.fit_predict(&x).unwrap());
        assert_eq!(a.threshold(), b.threshold());
    }

    #[test]
    fn test_constant_data_has_no_anomalies() {
        let x = Array2::from_elem((20, 3), 4.0);

        let mut iforest = IsolationForest::new();
        let labels = iforest.fit_predict(&x).unwrap();

        assert!(labels.iter().all(|&l| l == 1));
        assert!((iforest.threshold() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_rows_is_fit_error() {
        let x = Array2::from_shape_vec((1, 2), vec![1.0, 2.0]).unwrap();
        let err = IsolationForest::new().fit(&x).unwrap_err();
        assert_eq!(err.error_code(), "MODEL_FIT_FAILED");
    }

    #[test]
    fn test_non_finite_is_fit_error() {
        let x = Array2::from_shape_vec((3, 1), vec![1.0, f64::INFINITY, 2.0]).unwrap();
        let err = IsolationForest::new().fit(&x).unwrap_err();
        assert_eq!(err.error_code(), "MODEL_FIT_FAILED");
    }

    #[test]
    fn test_predict_before_fit_is_error() {
        let x = Array2::from_elem((3, 1), 1.0);
        assert!(IsolationForest::new().predict(&x).is_err());
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!((average_path_length(256) - 10.24477).abs() < 1e-4);
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = [5.0, 1.0, 3.0, 2.0, 4.0];
        assert!((quantile(&values, 0.95) - 4.8).abs() < 1e-12);
        assert_eq!(quantile(&values, 0.0), 1.0);
        assert_eq!(quantile(&values, 1.0), 5.0);
    }

    #[test]
    fn test_tree_isolates_single_point_in_short_path() {
        let x = clustered_with_outliers();
        let indices: Vec<usize> = (0..x.nrows()).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let tree = IsolationTree::build(&x, &indices, 0, 64, &mut rng);

        // With unlimited depth every training row ends up alone in a leaf
        let path = tree.path_length(x.row(0));
        assert!(path >= 1.0);
    }
}
