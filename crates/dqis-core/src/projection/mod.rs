//! Numeric projection.
//!
//! Selects the integer and float columns of a cleaned dataset and fills their
//! missing cells with the column mean, producing the dense row-major matrix
//! the anomaly model is fitted on.

use crate::error::{QualityError, Result};
use crate::utils::numeric_column_names;
use ndarray::Array2;
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// Numeric-only, mean-imputed view of a dataset.
#[derive(Debug, Clone)]
pub struct NumericProjection {
    /// Selected column names, in frame order.
    pub columns: Vec<String>,
    /// Mean used to fill each column's missing cells, aligned with `columns`.
    pub fill_means: Vec<f64>,
    /// Number of cells that were filled.
    pub imputed_cells: usize,
    /// One row per dataset row, one column per selected column.
    pub matrix: Array2<f64>,
}

impl NumericProjection {
    pub fn n_rows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn n_columns(&self) -> usize {
        self.matrix.ncols()
    }

    /// Per-column summary for reports.
    pub fn summary(&self) -> Vec<ProjectedColumn> {
        self.columns
            .iter()
            .zip(self.fill_means.iter())
            .map(|(name, mean)| ProjectedColumn {
                name: name.clone(),
                fill_mean: *mean,
            })
            .collect()
    }
}

/// One analysed column and the mean its gaps were filled with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedColumn {
    pub name: String,
    pub fill_mean: f64,
}

/// Builds [`NumericProjection`]s.
pub struct NumericProjector;

impl NumericProjector {
    /// Project a dataset onto its numeric columns.
    ///
    /// # Errors
    ///
    /// - [`QualityError::NoNumericColumns`] when no column is integer or float.
    /// - [`QualityError::NoValidValues`] when a numeric column has rows but no
    ///   values, so its mean is undefined.
    pub fn project(df: &DataFrame) -> Result<NumericProjection> {
        let columns = numeric_column_names(df);
        if columns.is_empty() {
            info!("No numeric columns among {:?}", df.get_column_names());
            return Err(QualityError::NoNumericColumns);
        }

        let n_rows = df.height();
        let mut filled: Vec<Vec<f64>> = Vec::with_capacity(columns.len());
        let mut fill_means = Vec::with_capacity(columns.len());
        let mut imputed_cells = 0;

        for name in &columns {
            let (values, mean, gaps) = Self::mean_filled(df, name)?;
            if gaps > 0 {
                debug!("Filled {} missing cells in '{}' with mean {:.4}", gaps, name, mean);
            }
            imputed_cells += gaps;
            fill_means.push(mean);
            filled.push(values);
        }

        let matrix = Array2::from_shape_fn((n_rows, columns.len()), |(row, col)| {
            filled[col][row]
        });

        info!(
            "Projected {} numeric columns over {} rows ({} cells imputed)",
            columns.len(),
            n_rows,
            imputed_cells
        );

        Ok(NumericProjection {
            columns,
            fill_means,
            imputed_cells,
            matrix,
        })
    }

    /// Column values as f64 with gaps (nulls and NaN) replaced by the mean of
    /// the remaining values. Returns the values, the mean and the gap count.
    fn mean_filled(df: &DataFrame, name: &str) -> Result<(Vec<f64>, f64, usize)> {
        let casted = df.column(name)?.cast(&DataType::Float64)?;
        let ca = casted.f64()?;

        let present: Vec<f64> = ca.into_iter().flatten().filter(|v| !v.is_nan()).collect();
        if present.is_empty() {
            if ca.is_empty() {
                return Ok((Vec::new(), 0.0, 0));
            }
            return Err(QualityError::NoValidValues(name.to_string()));
        }

        let mean = present.iter().sum::<f64>() / present.len() as f64;
        let gaps = ca.len() - present.len();

        let values = ca
            .into_iter()
            .map(|v| match v {
                Some(x) if !x.is_nan() => x,
                _ => mean,
            })
            .collect();

        Ok((values, mean, gaps))
    }
}
