// DQBench - Windowed data-quality scoring for sensor streams
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Window score aggregation.
//!
//! Drives the three scorers over every full window in stream order and
//! assembles the per-window result series. Each window's scoring is a pure
//! function of its own rows; no state crosses window boundaries.

use crate::accuracy::score_accuracy;
use crate::completeness::score_completeness;
use crate::config::QualityConfig;
use crate::error::Result;
use crate::record::RawRecord;
use crate::timeliness::score_timeliness;
use crate::window::WindowReader;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// Quality scores for one window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowScore {
    /// `value_id` of the window's first tuple.
    #[serde(rename = "Value_Start")]
    pub value_start: String,
    /// `value_id` of the window's last tuple.
    #[serde(rename = "Value_End")]
    pub value_end: String,
    /// MAD-based accuracy, in [0, 1].
    #[serde(rename = "Accuracy")]
    pub accuracy: f64,
    /// Present-value ratio, in [0, 1].
    #[serde(rename = "Completeness")]
    pub completeness: f64,
    /// Mean delay-decay score, in [0, 1].
    #[serde(rename = "Timeliness")]
    pub timeliness: f64,
}

/// Score a single window of records.
///
/// The three dimensions are independent of each other; only the window
/// boundaries tie them together.
pub fn score_window(window: &[RawRecord], config: &QualityConfig) -> WindowScore {
    let values: Vec<f64> = window.iter().map(|r| r.value_f64()).collect();
    let accuracy = score_accuracy(&values);
    let completeness = score_completeness(window);
    let timeliness = score_timeliness(window, config.volatility);

    let value_start = window.first().map(|r| r.value_id.clone()).unwrap_or_default();
    let value_end = window.last().map(|r| r.value_id.clone()).unwrap_or_default();

    debug!(
        "window {value_start}-{value_end}: accuracy={:.6} (invalid={}) completeness={:.4} timeliness={:.4}",
        accuracy.accuracy, accuracy.invalid_count, completeness.completeness, timeliness
    );

    WindowScore {
        value_start,
        value_end,
        accuracy: accuracy.accuracy,
        completeness: completeness.completeness,
        timeliness,
    }
}

/// Score every full window of a CSV source, in stream order.
pub fn score_stream<R: Read>(source: R, config: &QualityConfig) -> Result<Vec<WindowScore>> {
    config.validate()?;
    collect_scores(WindowReader::new(source, config.window_size)?, config)
}

/// Score every full window of a CSV file.
pub fn score_file(path: impl AsRef<Path>, config: &QualityConfig) -> Result<Vec<WindowScore>> {
    config.validate()?;
    collect_scores(WindowReader::open(path, config.window_size)?, config)
}

fn collect_scores<R: Read>(
    reader: WindowReader<R>,
    config: &QualityConfig,
) -> Result<Vec<WindowScore>> {
    let mut scores = Vec::new();
    for window in reader {
        let window = window?;
        scores.push(score_window(&window, config));
    }

    info!(
        "scored {} windows of {} rows",
        scores.len(),
        config.window_size
    );
    Ok(scores)
}

/// Write a score series as CSV with the canonical five columns.
pub fn write_scores<W: Write>(writer: W, scores: &[WindowScore]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for score in scores {
        csv_writer.serialize(score)?;
    }
    csv_writer.flush()?;
    Ok(())
}
