// DQBench - Windowed data-quality scoring for sensor streams
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Completeness scoring.
//!
//! Operates on the text layer, before any numeric coercion: a missing
//! measurement is the empty string. This is deliberately a different
//! missingness encoding than the accuracy scorer's NaN, because completeness
//! inspects what arrived on the wire, not what survived coercion.

use crate::record::RawRecord;

/// Completeness score plus the missing-value count behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletenessStats {
    /// `1 - missing_count / window_size`, in [0, 1].
    pub completeness: f64,
    /// Rows whose `value` field is the empty string.
    pub missing_count: usize,
}

/// Score one window of records. An empty window scores 1.
pub fn score_completeness(window: &[RawRecord]) -> CompletenessStats {
    let total = window.len();
    if total == 0 {
        return CompletenessStats {
            completeness: 1.0,
            missing_count: 0,
        };
    }

    let missing_count = window.iter().filter(|r| r.value.is_empty()).count();

    CompletenessStats {
        completeness: 1.0 - missing_count as f64 / total as f64,
        missing_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(value: &str) -> RawRecord {
        RawRecord::new("1", "s1", value, "1000", "1100")
    }

    #[test]
    fn test_full_window() {
        let window: Vec<_> = (0..10).map(|_| row("21.5")).collect();
        let stats = score_completeness(&window);
        assert_eq!(stats.missing_count, 0);
        assert_eq!(stats.completeness, 1.0);
    }

    #[test]
    fn test_exact_ratio() {
        // 20 empty out of 100 -> 0.80 exactly.
        let window: Vec<_> = (0..100)
            .map(|i| if i < 20 { row("") } else { row("7.0") })
            .collect();
        let stats = score_completeness(&window);
        assert_eq!(stats.missing_count, 20);
        assert_relative_eq!(stats.completeness, 0.80);
    }

    #[test]
    fn test_all_missing() {
        let window: Vec<_> = (0..5).map(|_| row("")).collect();
        let stats = score_completeness(&window);
        assert_eq!(stats.completeness, 0.0);
    }

    #[test]
    fn test_empty_window_defined_as_one() {
        let stats = score_completeness(&[]);
        assert_eq!(stats.completeness, 1.0);
        assert_eq!(stats.missing_count, 0);
    }

    #[test]
    fn test_unparseable_text_is_not_missing() {
        // Completeness counts presence, not parseability.
        let window = vec![row("garbage"), row("")];
        let stats = score_completeness(&window);
        assert_eq!(stats.missing_count, 1);
        assert_eq!(stats.completeness, 0.5);
    }
}
