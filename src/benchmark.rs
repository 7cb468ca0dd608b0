// DQBench - Windowed data-quality scoring for sensor streams
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Latency and throughput from engine interval logs.
//!
//! Stream engines emit one row per processed window with the window's wall
//! clock `start_time` and `end_time` as the final two columns. The header row
//! frequently omits names for those columns, so they are taken from the row
//! tail by position, never by name. Per-row latency is `end - start`;
//! throughput is rows per second over the full time span.

use crate::error::{DqError, Result};
use crate::record::coerce_f64;
use log::warn;
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Latency/throughput summary of one interval log.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Label for the run (file stem for file-based runs).
    pub label: String,
    /// Rows with coercible start/end times.
    pub total_records: usize,
    /// Mean of per-row `end - start`, milliseconds.
    pub avg_latency_ms: f64,
    /// Records per second over `max(end) - min(start)`.
    pub throughput_per_sec: f64,
}

/// Per-row latencies plus the run summary.
#[derive(Debug, Clone)]
pub struct IntervalLog {
    pub latencies_ms: Vec<f64>,
    pub summary: RunSummary,
}

/// Measure latency and throughput from an interval-log CSV source.
///
/// The first row is skipped as a header. Rows with fewer than two columns or
/// uncoercible timestamps are skipped with a warning rather than failing the
/// run. An empty log is an error.
pub fn measure_intervals<R: Read>(source: R, label: &str) -> Result<IntervalLog> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let mut latencies_ms = Vec::new();
    let mut min_start = f64::INFINITY;
    let mut max_end = f64::NEG_INFINITY;
    let mut skipped = 0usize;

    for row in reader.records() {
        let row = row?;
        if row.len() < 2 {
            skipped += 1;
            continue;
        }
        // Timestamps live in the last two columns, whatever the header says.
        let start = coerce_f64(row.get(row.len() - 2).unwrap_or(""));
        let end = coerce_f64(row.get(row.len() - 1).unwrap_or(""));
        if start.is_nan() || end.is_nan() {
            skipped += 1;
            continue;
        }
        latencies_ms.push(end - start);
        min_start = min_start.min(start);
        max_end = max_end.max(end);
    }

    if skipped > 0 {
        warn!("{label}: skipped {skipped} rows with uncoercible interval columns");
    }

    if latencies_ms.is_empty() {
        return Err(DqError::InvalidConfig(format!(
            "interval log {label} holds no coercible rows"
        )));
    }

    let total_records = latencies_ms.len();
    let avg_latency_ms = latencies_ms.iter().sum::<f64>() / total_records as f64;
    let span_ms = max_end - min_start;
    let throughput_per_sec = if span_ms > 0.0 {
        total_records as f64 / (span_ms / 1000.0)
    } else {
        0.0
    };

    Ok(IntervalLog {
        latencies_ms,
        summary: RunSummary {
            label: label.to_string(),
            total_records,
            avg_latency_ms,
            throughput_per_sec,
        },
    })
}

/// Measure one interval-log file; the label is the file stem.
pub fn measure_interval_file(path: impl AsRef<Path>) -> Result<IntervalLog> {
    let path = path.as_ref();
    let label = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("run")
        .to_string();
    let file = std::fs::File::open(path)?;
    measure_intervals(file, &label)
}

/// Summarize several interval-log files for side-by-side comparison.
///
/// Files that fail to parse are skipped with a warning so one bad log does
/// not sink the whole comparison.
pub fn summarize_runs<P: AsRef<Path>>(paths: &[P]) -> Vec<RunSummary> {
    let mut summaries = Vec::new();
    for path in paths {
        match measure_interval_file(path) {
            Ok(log) => summaries.push(log.summary),
            Err(e) => warn!("skipping {}: {e}", path.as_ref().display()),
        }
    }
    summaries
}
