//! Workbook reader backed by calamine.
//!
//! Reads the first worksheet. The first row holds column names; every other
//! row is data. Column types are inferred from the cells actually present.

use crate::error::{QualityError, Result};
use crate::utils::is_missing_marker;
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use polars::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;

const FORMAT: &str = "spreadsheet";

/// Inferred storage type of a worksheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Int,
    Float,
    Bool,
    Text,
}

impl CellKind {
    fn of(cell: &Data) -> Option<Self> {
        match cell {
            Data::Empty | Data::Error(_) => None,
            Data::String(s) if is_missing_marker(s) => None,
            Data::Int(_) => Some(CellKind::Int),
            Data::Float(f) if is_integral(*f) => Some(CellKind::Int),
            Data::Float(_) => Some(CellKind::Float),
            Data::Bool(_) => Some(CellKind::Bool),
            _ => Some(CellKind::Text),
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (CellKind::Int, CellKind::Float) | (CellKind::Float, CellKind::Int) => {
                CellKind::Float
            }
            _ => CellKind::Text,
        }
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64
}

pub(crate) fn read_spreadsheet(bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| QualityError::parse(FORMAT, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| QualityError::parse(FORMAT, "workbook has no worksheets"))?
        .map_err(|e| QualityError::parse(FORMAT, e))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| QualityError::parse(FORMAT, "first worksheet is empty"))?;
    let names = column_names(header);

    let mut cells: Vec<Vec<Data>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get(idx).cloned().unwrap_or(Data::Empty));
        }
    }

    let columns: Vec<Column> = names
        .iter()
        .zip(cells.iter())
        .map(|(name, column)| build_series(name, column).into_column())
        .collect();

    DataFrame::new(columns).map_err(|e| QualityError::parse(FORMAT, e))
}

/// Header names. Blank headers become `Unnamed: <position>` and repeated
/// names get a `.1`, `.2`, ... suffix so every column stays addressable.
fn column_names(header: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let raw = match cell {
                Data::Empty => String::new(),
                other => other.to_string(),
            };
            let base = if raw.is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                raw
            };

            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

fn build_series(name: &str, column: &[Data]) -> Series {
    let kind = column
        .iter()
        .filter_map(CellKind::of)
        .reduce(CellKind::merge)
        .unwrap_or(CellKind::Text);

    match kind {
        CellKind::Int => {
            let values: Vec<Option<i64>> = column
                .iter()
                .map(|cell| match cell {
                    Data::Int(i) => Some(*i),
                    Data::Float(f) if is_integral(*f) => Some(*f as i64),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        CellKind::Float => {
            let values: Vec<Option<f64>> = column
                .iter()
                .map(|cell| match cell {
                    Data::Int(i) => Some(*i as f64),
                    Data::Float(f) => Some(*f),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        CellKind::Bool => {
            let values: Vec<Option<bool>> = column
                .iter()
                .map(|cell| match cell {
                    Data::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        CellKind::Text => {
            let values: Vec<Option<String>> = column
                .iter()
                .map(|cell| match cell {
                    Data::Empty | Data::Error(_) => None,
                    Data::String(s) if is_missing_marker(s) => None,
                    other => Some(other.to_string()),
                })
                .collect();
            Series::new(name.into(), values)
        }
    }
}
