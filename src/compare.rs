// DQBench - Windowed data-quality scoring for sensor streams
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Reconciliation against an externally produced reference series.
//!
//! The reference table's columns are mapped by position, never by name: the
//! contract is `{0: Accuracy, 1: Completeness, 2: Value_Start, 3: Value_End,
//! 4: Timeliness}`, with the header row skipped and untrusted. Every field of
//! both series is coerced to f64 (failures become NaN) before differencing,
//! so the comparison tolerates string-typed references and two-decimal
//! rounding disagreement between implementations.

use crate::error::{DqError, Result};
use crate::record::coerce_f64;
use crate::score::WindowScore;
use log::{info, warn};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Positional layout of the reference table.
const REF_ACCURACY: usize = 0;
const REF_COMPLETENESS: usize = 1;
const REF_VALUE_START: usize = 2;
const REF_VALUE_END: usize = 3;
const REF_TIMELINESS: usize = 4;
const REF_ARITY: usize = 5;

/// Default tolerance: differences within two-decimal rounding pass.
pub const DEFAULT_TOLERANCE: f64 = 0.009;

/// One reference row, numerically coerced.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceRecord {
    pub accuracy: f64,
    pub completeness: f64,
    pub value_start: f64,
    pub value_end: f64,
    pub timeliness: f64,
}

/// Per-column deltas (`computed - reference`) for one retained window.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DiffRow {
    /// Window position in the series (0-based).
    #[serde(rename = "Window")]
    pub window: usize,
    #[serde(rename = "Value_Start")]
    pub value_start: f64,
    #[serde(rename = "Value_End")]
    pub value_end: f64,
    #[serde(rename = "Accuracy")]
    pub accuracy: f64,
    #[serde(rename = "Completeness")]
    pub completeness: f64,
    #[serde(rename = "Timeliness")]
    pub timeliness: f64,
}

impl DiffRow {
    /// Largest absolute delta across the five columns; NaN deltas are
    /// ignored, matching the coercion-failure policy.
    pub fn max_abs_delta(&self) -> f64 {
        [
            self.value_start,
            self.value_end,
            self.accuracy,
            self.completeness,
            self.timeliness,
        ]
        .into_iter()
        .filter(|d| !d.is_nan())
        .fold(0.0, |acc, d| acc.max(d.abs()))
    }
}

/// Outcome of reconciling a computed series against a reference.
#[derive(Debug, Clone, Serialize)]
pub struct DifferenceReport {
    /// Rows whose max absolute delta exceeded the tolerance.
    pub mismatches: Vec<DiffRow>,
    /// Tolerance the report was built with.
    pub tolerance: f64,
    /// Number of windows compared.
    pub windows_compared: usize,
}

impl DifferenceReport {
    /// True when every window agreed within tolerance.
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Read a reference table from a CSV source.
///
/// The first row is treated as a header and skipped; data rows must carry at
/// least five columns (position-mapped), otherwise the row is an alignment
/// failure. Fields that fail numeric coercion become NaN, not errors.
pub fn read_reference<R: Read>(source: R) -> Result<Vec<ReferenceRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let mut records = Vec::new();
    for (row_idx, row) in reader.records().enumerate() {
        let row = row?;
        if row.len() < REF_ARITY {
            return Err(DqError::ReferenceArity {
                row: row_idx,
                found: row.len(),
                expected: REF_ARITY,
            });
        }
        let field = |idx: usize| coerce_f64(row.get(idx).unwrap_or(""));
        records.push(ReferenceRecord {
            accuracy: field(REF_ACCURACY),
            completeness: field(REF_COMPLETENESS),
            value_start: field(REF_VALUE_START),
            value_end: field(REF_VALUE_END),
            timeliness: field(REF_TIMELINESS),
        });
    }
    Ok(records)
}

/// Read a reference table from a CSV file.
pub fn read_reference_file(path: impl AsRef<Path>) -> Result<Vec<ReferenceRecord>> {
    let file = std::fs::File::open(path)?;
    read_reference(file)
}

/// Reconcile a computed score series against a reference series.
///
/// Series must be the same length; a mismatch is an alignment error, not a
/// silent truncation. Rows are paired by position, differenced per column,
/// and retained only when the max absolute delta exceeds the tolerance. NaN
/// deltas (either side failed coercion) never retain a row by themselves.
pub fn compare_scores(
    computed: &[WindowScore],
    reference: &[ReferenceRecord],
    tolerance: f64,
) -> Result<DifferenceReport> {
    if computed.len() != reference.len() {
        return Err(DqError::LengthMismatch {
            computed: computed.len(),
            reference: reference.len(),
        });
    }

    let mut mismatches = Vec::new();
    for (window, (score, reference_row)) in computed.iter().zip(reference).enumerate() {
        let diff = DiffRow {
            window,
            value_start: coerce_f64(&score.value_start) - reference_row.value_start,
            value_end: coerce_f64(&score.value_end) - reference_row.value_end,
            accuracy: score.accuracy - reference_row.accuracy,
            completeness: score.completeness - reference_row.completeness,
            timeliness: score.timeliness - reference_row.timeliness,
        };
        if diff.max_abs_delta() > tolerance {
            mismatches.push(diff);
        }
    }

    if mismatches.is_empty() {
        info!(
            "reconciliation passed: {} windows within tolerance {tolerance}",
            computed.len()
        );
    } else {
        warn!(
            "reconciliation found {} mismatched windows (tolerance {tolerance})",
            mismatches.len()
        );
    }

    Ok(DifferenceReport {
        mismatches,
        tolerance,
        windows_compared: computed.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(start: &str, end: &str, acc: f64, comp: f64, time: f64) -> WindowScore {
        WindowScore {
            value_start: start.to_string(),
            value_end: end.to_string(),
            accuracy: acc,
            completeness: comp,
            timeliness: time,
        }
    }

    #[test]
    fn test_reference_positional_mapping() {
        // Header names are deliberately wrong; positions rule.
        let csv = "A,B,C,D,E\n0.95,0.80,1,100,0.99\n";
        let refs = read_reference(csv.as_bytes()).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].accuracy, 0.95);
        assert_eq!(refs[0].completeness, 0.80);
        assert_eq!(refs[0].value_start, 1.0);
        assert_eq!(refs[0].value_end, 100.0);
        assert_eq!(refs[0].timeliness, 0.99);
    }

    #[test]
    fn test_reference_bad_field_becomes_nan() {
        let csv = "a,b,c,d,e\nbroken,0.8,1,100,0.99\n";
        let refs = read_reference(csv.as_bytes()).unwrap();
        assert!(refs[0].accuracy.is_nan());
        assert_eq!(refs[0].completeness, 0.8);
    }

    #[test]
    fn test_reference_short_row_is_alignment_error() {
        let csv = "a,b,c,d,e\n0.95,0.80,1\n";
        match read_reference(csv.as_bytes()) {
            Err(DqError::ReferenceArity { row, found, .. }) => {
                assert_eq!(row, 0);
                assert_eq!(found, 3);
            }
            other => panic!("expected arity error, got {other:?}"),
        }
    }

    #[test]
    fn test_row_within_tolerance_dropped() {
        let computed = vec![score("1", "100", 0.95, 0.80, 0.99)];
        let csv = "a,b,c,d,e\n0.951,0.799,1,100,0.991\n";
        let refs = read_reference(csv.as_bytes()).unwrap();
        let report = compare_scores(&computed, &refs, DEFAULT_TOLERANCE).unwrap();
        assert!(report.passed());
        assert_eq!(report.windows_compared, 1);
    }

    #[test]
    fn test_row_beyond_tolerance_retained() {
        let computed = vec![score("1", "100", 0.95, 0.80, 0.99)];
        let csv = "a,b,c,d,e\n0.90,0.80,1,100,0.99\n";
        let refs = read_reference(csv.as_bytes()).unwrap();
        let report = compare_scores(&computed, &refs, DEFAULT_TOLERANCE).unwrap();
        assert!(!report.passed());
        assert_eq!(report.mismatches.len(), 1);
        assert_eq!(report.mismatches[0].window, 0);
        assert!((report.mismatches[0].accuracy - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_identifier_mismatch_retained() {
        let computed = vec![score("1", "100", 0.95, 0.80, 0.99)];
        let csv = "a,b,c,d,e\n0.95,0.80,2,100,0.99\n";
        let refs = read_reference(csv.as_bytes()).unwrap();
        let report = compare_scores(&computed, &refs, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(report.mismatches.len(), 1);
        assert_eq!(report.mismatches[0].value_start, -1.0);
    }

    #[test]
    fn test_nan_delta_alone_never_retains() {
        // Uncoercible computed identifier vs numeric reference: delta is NaN,
        // which must not flag the row on its own.
        let computed = vec![score("not-a-number", "100", 0.95, 0.80, 0.99)];
        let csv = "a,b,c,d,e\n0.95,0.80,1,100,0.99\n";
        let refs = read_reference(csv.as_bytes()).unwrap();
        let report = compare_scores(&computed, &refs, DEFAULT_TOLERANCE).unwrap();
        assert!(report.passed());
    }

    #[test]
    fn test_length_mismatch_is_error() {
        let computed = vec![score("1", "100", 1.0, 1.0, 1.0)];
        let refs = Vec::new();
        match compare_scores(&computed, &refs, DEFAULT_TOLERANCE) {
            Err(DqError::LengthMismatch {
                computed: c,
                reference: r,
            }) => {
                assert_eq!(c, 1);
                assert_eq!(r, 0);
            }
            other => panic!("expected length mismatch, got {other:?}"),
        }
    }
}
