//! Data cleaning.
//!
//! This module provides functionality for:
//! - Dropping a leftover positional index column
//! - Counting missing cells
//! - Counting and removing exact duplicate rows
//!
//! Cleaning never mutates its input; it returns a new frame together with
//! the counts taken along the way.

mod index_column;

pub use index_column::{INDEX_COLUMN_NAME, is_index_column_name};

use crate::error::Result;
use polars::prelude::*;
use tracing::{debug, info};

/// Result of cleaning a raw dataset.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    /// Cleaned frame: index column dropped, duplicates removed, original
    /// row order kept.
    pub data: DataFrame,
    /// Missing cells across all remaining columns, counted before duplicate
    /// removal.
    pub missing_values: usize,
    /// Rows removed as repeats of an earlier row.
    pub duplicate_rows: usize,
    /// Columns dropped as leftover index columns.
    pub dropped_columns: Vec<String>,
    /// Human-readable record of what was done.
    pub actions: Vec<String>,
}

/// Data cleaner for automatic dataset cleaning operations.
#[derive(Debug, Clone)]
pub struct DataCleaner {
    drop_index_column: bool,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DataCleaner {
    pub fn new(drop_index_column: bool) -> Self {
        Self { drop_index_column }
    }

    /// Clean a dataset.
    ///
    /// 1. Drop leftover index columns (if enabled)
    /// 2. Count missing cells
    /// 3. Count and remove duplicate rows, keeping first occurrences
    pub fn clean(&self, df: &DataFrame) -> Result<CleaningOutcome> {
        let mut actions = Vec::new();

        info!("Cleaning dataset {:?}...", df.shape());

        // 1. Leftover index column
        let (df, dropped_columns) = if self.drop_index_column {
            Self::drop_index_columns(df)
        } else {
            (df.clone(), Vec::new())
        };

        if dropped_columns.is_empty() {
            actions.push("No index column found".to_string());
        } else {
            actions.push(format!("Dropped index column(s): {:?}", dropped_columns));
            debug!("Dropped index column(s): {:?}", dropped_columns);
        }

        // 2. Missing cells
        let missing_values = Self::count_missing(&df);
        actions.push(format!("Found {} missing values", missing_values));
        debug!("Found {} missing values", missing_values);

        // 3. Duplicate rows
        let before = df.height();
        let data = Self::drop_duplicates(&df)?;
        let duplicate_rows = before - data.height();

        if duplicate_rows > 0 {
            let pct = (duplicate_rows as f64 / before as f64) * 100.0;
            actions.push(format!(
                "Removed {} duplicate rows ({:.1}%)",
                duplicate_rows, pct
            ));
            debug!("Removed {} duplicate rows", duplicate_rows);
        } else {
            actions.push("No duplicate rows found".to_string());
        }

        Ok(CleaningOutcome {
            data,
            missing_values,
            duplicate_rows,
            dropped_columns,
            actions,
        })
    }

    fn drop_index_columns(df: &DataFrame) -> (DataFrame, Vec<String>) {
        let dropped: Vec<String> = df
            .get_column_names()
            .iter()
            .filter(|name| is_index_column_name(name.as_str()))
            .map(|name| name.to_string())
            .collect();

        if dropped.is_empty() {
            return (df.clone(), dropped);
        }

        let cols: Vec<PlSmallStr> = dropped.iter().map(|s| s.as_str().into()).collect();
        (df.drop_many(cols), dropped)
    }

    /// Total missing cells across every column.
    pub fn count_missing(df: &DataFrame) -> usize {
        df.get_columns().iter().map(|col| col.null_count()).sum()
    }

    /// Remove rows that repeat an earlier row, keeping the first occurrence
    /// and the original order.
    pub fn drop_duplicates(df: &DataFrame) -> Result<DataFrame> {
        if df.height() == 0 || df.width() == 0 {
            return Ok(df.clone());
        }

        Ok(df.unique_stable(None, UniqueKeepStrategy::First, None)?)
    }
}
