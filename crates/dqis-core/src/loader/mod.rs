//! Dataset loading.
//!
//! Turns an uploaded file (name + bytes) into a typed [`DataFrame`]. The file
//! name's suffix picks the parser: `.csv` goes to the delimited-text reader,
//! everything else to the spreadsheet reader. Any parse failure ends the run
//! with [`QualityError::Parse`].

mod csv;
mod spreadsheet;

use crate::error::{QualityError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Declared format of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// Delimited text with a header row.
    Csv,
    /// Excel / OpenDocument workbook; the first sheet is read.
    Spreadsheet,
}

impl FileFormat {
    /// Pick the parser from a file name. Only a `.csv` suffix selects the CSV
    /// reader; any other name is treated as a spreadsheet.
    pub fn from_file_name(name: &str) -> Self {
        if name.trim().to_ascii_lowercase().ends_with(".csv") {
            FileFormat::Csv
        } else {
            FileFormat::Spreadsheet
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => write!(f, "CSV"),
            FileFormat::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

/// A single uploaded file.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-supplied file name; only its suffix matters.
    pub file_name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read an upload from disk, keeping the path's file name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self { file_name, bytes })
    }

    pub fn format(&self) -> FileFormat {
        FileFormat::from_file_name(&self.file_name)
    }
}

/// Parses uploads into data frames.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Parse an upload according to its declared format.
    pub fn load(upload: &Upload) -> Result<DataFrame> {
        if upload.file_name.trim().is_empty() {
            return Err(QualityError::UnsupportedFormat(
                "the upload has no file name".to_string(),
            ));
        }

        let format = upload.format();
        info!(
            "Loading {} ({} bytes) as {}",
            upload.file_name,
            upload.bytes.len(),
            format
        );

        let df = match format {
            FileFormat::Csv => csv::read_csv(&upload.bytes)?,
            FileFormat::Spreadsheet => spreadsheet::read_spreadsheet(&upload.bytes)?,
        };
        let df = Self::type_empty_columns(df)?;

        info!("Dataset loaded: {:?}", df.shape());
        Ok(df)
    }

    /// Columns with rows but no values carry no type information of their
    /// own. They are read as floating point, so an empty measurement column
    /// is still seen as numeric downstream.
    fn type_empty_columns(mut df: DataFrame) -> Result<DataFrame> {
        if df.height() == 0 {
            return Ok(df);
        }

        let empty: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|col| col.null_count() == col.len() && col.dtype() != &DataType::Float64)
            .map(|col| col.name().to_string())
            .collect();

        for name in empty {
            debug!("Column '{}' has no values; typing it as Float64", name);
            let casted = df.column(&name)?.cast(&DataType::Float64)?;
            df.with_column(casted)?;
        }

        Ok(df)
    }
}
