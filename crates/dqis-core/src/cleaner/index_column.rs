//! Recognition of a leftover positional index column.
//!
//! A dataframe exported together with its row index comes back with an extra
//! first column that has no header. Both readers name a blank header after
//! its position, so the index arrives as `Unnamed: 0`. Blank headers further
//! right are real data and are kept.

/// Name the loaders give a blank first header.
pub const INDEX_COLUMN_NAME: &str = "Unnamed: 0";

/// Whether a column name is the exported positional index.
pub fn is_index_column_name(name: &str) -> bool {
    name == INDEX_COLUMN_NAME
}
