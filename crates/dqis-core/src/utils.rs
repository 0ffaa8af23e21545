//! Shared utilities for the data quality pipeline.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Names of the numeric columns of a frame, in frame order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

// =============================================================================
// Missing Value Markers
// =============================================================================

/// Cell contents read as missing, matched exactly (no trimming). Empty
/// cells are missing as well.
pub const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Check if a raw text cell should be treated as missing.
pub fn is_missing_marker(s: &str) -> bool {
    s.is_empty() || MISSING_MARKERS.contains(&s)
}

// =============================================================================
// Cell Formatting
// =============================================================================

/// Render a single cell for display. Missing cells render as an empty string.
pub fn format_cell(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(is_numeric_dtype(&DataType::UInt8));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_numeric_column_names_preserve_order() {
        let df = df![
            "b" => [1.0, 2.0],
            "name" => ["x", "y"],
            "a" => [3i64, 4],
        ]
        .unwrap();
        assert_eq!(numeric_column_names(&df), vec!["b", "a"]);
    }

    #[test]
    fn test_is_missing_marker() {
        assert!(is_missing_marker(""));
        assert!(is_missing_marker("NaN"));
        assert!(is_missing_marker("N/A"));
        assert!(is_missing_marker("#N/A N/A"));
        assert!(is_missing_marker("-1.#IND"));
        assert!(is_missing_marker("1.#QNAN"));
        assert!(!is_missing_marker("  "));
        assert!(!is_missing_marker(" NA"));
        assert!(!is_missing_marker("0"));
        assert!(!is_missing_marker("none of these"));
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(&AnyValue::Null), "");
        assert_eq!(format_cell(&AnyValue::String("abc")), "abc");
        assert_eq!(format_cell(&AnyValue::Int64(42)), "42");
    }
}
