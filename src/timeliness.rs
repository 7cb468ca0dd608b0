// DQBench - Windowed data-quality scoring for sensor streams
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Timeliness scoring with linear delay decay.
//!
//! Per-row currency is `available_time - timestamp` in milliseconds; the row
//! scores `max(1 - currency / volatility, 0)`, reaching zero once the delay
//! hits the volatility reference and staying clamped there beyond it. The
//! window score is the mean over rows whose time columns coerce; rows that
//! fail coercion are excluded rather than failing the window.

use crate::record::RawRecord;

/// Score one window of records against a volatility reference.
///
/// Volatility is the currency at which timeliness decays to zero and must be
/// positive. An empty window, or one where no row's time columns coerce,
/// scores 1.
pub fn score_timeliness(window: &[RawRecord], volatility: i64) -> f64 {
    debug_assert!(volatility > 0);

    let mut sum = 0.0;
    let mut contributing = 0usize;

    for record in window {
        if let Some(currency) = record.currency_ms() {
            let row_score = (1.0 - currency as f64 / volatility as f64).max(0.0);
            sum += row_score;
            contributing += 1;
        }
    }

    if contributing == 0 {
        return 1.0;
    }

    sum / contributing as f64
}
