// DQBench CLI - Column statistics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Quick column statistics over a dataset file.
//!
//! One streaming pass: row count, distinct-value count, and numeric min/max
//! over a named column. Fields that fail numeric coercion still count toward
//! the distinct values but are skipped for min/max.

use dqbench::record::coerce_f64;
use dqbench::{DqError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Statistics of one column.
#[derive(Debug, Clone)]
pub struct ColumnStats {
    pub column: String,
    pub total_rows: usize,
    pub unique_values: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Most frequent values, descending by count.
    pub top_values: Vec<(String, usize)>,
}

/// Compute column statistics over a CSV file.
pub fn column_stats(path: impl AsRef<Path>, column: &str, top_n: usize) -> Result<ColumnStats> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path.as_ref())?;
    let column_idx = reader
        .headers()?
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| DqError::MissingColumn(column.to_string()))?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut total_rows = 0usize;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut row = csv::StringRecord::new();

    while reader.read_record(&mut row)? {
        total_rows += 1;
        let field = row.get(column_idx).unwrap_or("");
        *counts.entry(field.to_string()).or_insert(0) += 1;

        let numeric = coerce_f64(field);
        if !numeric.is_nan() {
            min = min.min(numeric);
            max = max.max(numeric);
        }
    }

    let mut top_values: Vec<(String, usize)> = counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    top_values.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_values.truncate(top_n);

    Ok(ColumnStats {
        column: column.to_string(),
        total_rows,
        unique_values: counts.len(),
        min: (min != f64::INFINITY).then_some(min),
        max: (max != f64::NEG_INFINITY).then_some(max),
        top_values,
    })
}
