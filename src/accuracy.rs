// DQBench - Windowed data-quality scoring for sensor streams
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Accuracy scoring via MAD-based outlier detection.
//!
//! Missing values (NaN after coercion) count as invalid, and so does any
//! value whose absolute deviation from the window median exceeds
//! `3 * MAD / 0.6745`. The 0.6745 constant scales MAD to the standard
//! deviation of a normal distribution, so the threshold behaves like a
//! 3-sigma rule while staying robust to the outliers themselves.

/// Scales MAD to a normal distribution's standard deviation.
const MAD_TO_SIGMA: f64 = 1.0 / 0.6745;

/// Accuracy score plus the diagnostics behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyStats {
    /// `1 - invalid_count / window_size`, in [0, 1].
    pub accuracy: f64,
    /// Median absolute deviation of the finite values.
    pub mad: f64,
    /// Count of missing plus out-of-threshold values.
    pub invalid_count: usize,
    /// Median of the finite values.
    pub median: f64,
    /// Outlier threshold `3 * MAD / 0.6745`.
    pub threshold: f64,
}

/// Score one window of numeric values.
///
/// `values` is the coerced `value` column: one entry per row, missing entries
/// as NaN. The divisor is always the nominal window size, never the count
/// after NaN removal, so missing data penalizes accuracy directly.
///
/// An empty window scores 1.0 with zeroed diagnostics. A window with no
/// finite values scores exactly 0. With MAD = 0 the strict `>` comparison
/// makes any deviation from the median invalid; that strictness is the
/// contract, not an edge case to soften.
pub fn score_accuracy(values: &[f64]) -> AccuracyStats {
    let window_size = values.len();
    if window_size == 0 {
        return AccuracyStats {
            accuracy: 1.0,
            mad: 0.0,
            invalid_count: 0,
            median: 0.0,
            threshold: 0.0,
        };
    }

    let mut invalid_count = values.iter().filter(|v| v.is_nan()).count();
    let finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();

    if finite.is_empty() {
        return AccuracyStats {
            accuracy: 0.0,
            mad: 0.0,
            invalid_count,
            median: 0.0,
            threshold: 0.0,
        };
    }

    let median = median(&finite);
    let deviations: Vec<f64> = finite.iter().map(|v| (v - median).abs()).collect();
    let mad = self::median(&deviations);
    let threshold = 3.0 * mad * MAD_TO_SIGMA;

    invalid_count += deviations.iter().filter(|d| **d > threshold).count();

    AccuracyStats {
        accuracy: 1.0 - invalid_count as f64 / window_size as f64,
        mad,
        invalid_count,
        median,
        threshold,
    }
}

/// Median of a non-empty slice. Averages the two middle elements for even
/// lengths, matching the usual linear-interpolation definition.
fn median(values: &[f64]) -> f64 {
    debug_assert!(!values.is_empty());
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("median input must be finite"));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
