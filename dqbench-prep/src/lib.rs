// DQBench Prep - Dataset preprocessing utilities
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # DQBench Prep
//!
//! Preprocessing utilities that turn raw multi-sensor exports into the
//! single-sensor, epoch-millisecond CSV files the scoring engine consumes:
//!
//! - [`split_by_sensor`]: one output file per `sensor_id`
//! - [`extract_first_days`]: keep only the first N days of a sensor file
//! - [`normalize_timestamps`]: rewrite datetime text to epoch milliseconds
//! - [`check_consistency`]: report rows violating the strictly-increasing
//!   `value_id`/`timestamp` ordering
//!
//! All of them stream their input row by row; memory stays bounded regardless
//! of file size.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{info, warn};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Preprocessing error types.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, PrepError>;

const MS_PER_DAY: i64 = 86_400_000;

/// Split a multi-sensor CSV into one file per `sensor_id`.
///
/// Rows keep their original columns and order; each output file is named
/// `sensor_<id>.csv` and carries the input header once. Returns the paths of
/// the files written.
pub fn split_by_sensor(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(input.as_ref())?;
    let headers = reader.headers()?.clone();
    let sensor_idx = headers
        .iter()
        .position(|h| h == "sensor_id")
        .ok_or_else(|| PrepError::MissingColumn("sensor_id".to_string()))?;

    let mut writers: HashMap<String, csv::Writer<File>> = HashMap::new();
    let mut paths = Vec::new();
    let mut row = csv::StringRecord::new();
    let mut total = 0usize;

    while reader.read_record(&mut row)? {
        let sensor_id = row.get(sensor_idx).unwrap_or("").to_string();
        if !writers.contains_key(&sensor_id) {
            let path = output_dir.join(format!("sensor_{sensor_id}.csv"));
            let mut writer = csv::Writer::from_path(&path)?;
            writer.write_record(&headers)?;
            writers.insert(sensor_id.clone(), writer);
            paths.push(path);
        }
        let writer = writers.get_mut(&sensor_id).expect("inserted above");
        writer.write_record(&row)?;
        total += 1;
    }

    for writer in writers.values_mut() {
        writer.flush()?;
    }

    info!(
        "split {total} rows into {} sensor files under {}",
        paths.len(),
        output_dir.display()
    );
    Ok(paths)
}

/// Keep only rows within the first `days` days of a sensor file.
///
/// The cutoff is the first row's timestamp plus `days`; reading stops as soon
/// as a row reaches the cutoff, so only the needed prefix is scanned. Rows
/// whose timestamp fails to parse are dropped (counted, not fatal). Fails if
/// no row carries a parseable timestamp.
pub fn extract_first_days(
    input: impl AsRef<Path>,
    days: u32,
    output: impl AsRef<Path>,
) -> Result<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(input.as_ref())?;
    let headers = reader.headers()?.clone();
    let ts_idx = headers
        .iter()
        .position(|h| h == "timestamp")
        .ok_or_else(|| PrepError::MissingColumn("timestamp".to_string()))?;

    let mut writer = csv::Writer::from_path(output.as_ref())?;
    writer.write_record(&headers)?;

    let mut cutoff_ms: Option<i64> = None;
    let mut kept = 0usize;
    let mut dropped = 0usize;
    let mut row = csv::StringRecord::new();

    while reader.read_record(&mut row)? {
        let ts_ms = match parse_timestamp_ms(row.get(ts_idx).unwrap_or("")) {
            Some(ts) => ts,
            None => {
                dropped += 1;
                continue;
            }
        };
        let cutoff = *cutoff_ms.get_or_insert(ts_ms + days as i64 * MS_PER_DAY);
        if ts_ms >= cutoff {
            break;
        }
        writer.write_record(&row)?;
        kept += 1;
    }

    writer.flush()?;
    if dropped > 0 {
        warn!("dropped {dropped} rows with unparseable timestamps");
    }
    if cutoff_ms.is_none() {
        return Err(PrepError::EmptyInput(format!(
            "{} has no parseable timestamps",
            input.as_ref().display()
        )));
    }

    info!("extracted first {days} days: {kept} rows");
    Ok(kept)
}

/// Rewrite the `timestamp` column from datetime text to epoch milliseconds.
///
/// Rows whose timestamp is already epoch milliseconds pass through unchanged;
/// rows that fail to parse entirely keep their original text (counted and
/// logged). Returns the number of rows written.
pub fn normalize_timestamps(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(input.as_ref())?;
    let headers = reader.headers()?.clone();
    let ts_idx = headers
        .iter()
        .position(|h| h == "timestamp")
        .ok_or_else(|| PrepError::MissingColumn("timestamp".to_string()))?;

    let mut writer = csv::Writer::from_path(output.as_ref())?;
    writer.write_record(&headers)?;

    let mut total = 0usize;
    let mut unparsed = 0usize;
    let mut row = csv::StringRecord::new();

    while reader.read_record(&mut row)? {
        let mut out = csv::StringRecord::new();
        for (idx, field) in row.iter().enumerate() {
            if idx == ts_idx {
                match parse_timestamp_ms(field) {
                    Some(ts) => out.push_field(&ts.to_string()),
                    None => {
                        unparsed += 1;
                        out.push_field(field);
                    }
                }
            } else {
                out.push_field(field);
            }
        }
        writer.write_record(&out)?;
        total += 1;
    }

    writer.flush()?;
    if unparsed > 0 {
        warn!("{unparsed} timestamps could not be normalized");
    }
    info!("normalized {total} rows");
    Ok(total)
}

/// One ordering violation found by [`check_consistency`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyViolation {
    /// 1-based data row number.
    pub row: usize,
    /// Column that failed the ordering check.
    pub column: &'static str,
    /// Offending field text.
    pub value: String,
    /// Predecessor's field text.
    pub previous: String,
}

/// Outcome of a [`check_consistency`] pass.
#[derive(Debug, Clone, Default)]
pub struct ConsistencyReport {
    /// Data rows scanned.
    pub total_rows: usize,
    /// Rows whose `value_id` was not strictly greater than its predecessor's.
    pub value_id_violations: usize,
    /// Rows whose `timestamp` was not strictly greater than its predecessor's.
    pub timestamp_violations: usize,
    /// Every violation, in stream order.
    pub violations: Vec<ConsistencyViolation>,
}

impl ConsistencyReport {
    /// True when both columns are strictly increasing throughout.
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check that `value_id` and `timestamp` are strictly increasing.
///
/// The scoring engine assumes this ordering but cannot repair it; this pass
/// detects where an input breaks it. `value_id` is compared numerically,
/// `timestamp` as epoch milliseconds (datetime text accepted, see
/// [`parse_timestamp_ms`]). A field that fails coercion is skipped: it is not
/// a violation itself and does not serve as the baseline for the next row.
pub fn check_consistency(input: impl AsRef<Path>) -> Result<ConsistencyReport> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(input.as_ref())?;
    let headers = reader.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PrepError::MissingColumn(name.to_string()))
    };
    let id_idx = find("value_id")?;
    let ts_idx = find("timestamp")?;

    let mut report = ConsistencyReport::default();
    let mut last_id: Option<i64> = None;
    let mut last_id_text = String::new();
    let mut last_ts: Option<i64> = None;
    let mut last_ts_text = String::new();
    let mut row = csv::StringRecord::new();

    while reader.read_record(&mut row)? {
        report.total_rows += 1;

        let id_text = row.get(id_idx).unwrap_or("");
        match id_text.trim().parse::<i64>() {
            Ok(id) => {
                if last_id.is_some_and(|prev| id <= prev) {
                    warn!(
                        "value_id not increasing at row {}: {id_text} (previous: {last_id_text})",
                        report.total_rows
                    );
                    report.value_id_violations += 1;
                    report.violations.push(ConsistencyViolation {
                        row: report.total_rows,
                        column: "value_id",
                        value: id_text.to_string(),
                        previous: last_id_text.clone(),
                    });
                }
                last_id = Some(id);
                last_id_text = id_text.to_string();
            }
            Err(_) => last_id = None,
        }

        let ts_text = row.get(ts_idx).unwrap_or("");
        match parse_timestamp_ms(ts_text) {
            Some(ts) => {
                if last_ts.is_some_and(|prev| ts <= prev) {
                    warn!(
                        "timestamp not increasing at row {}: {ts_text} (previous: {last_ts_text})",
                        report.total_rows
                    );
                    report.timestamp_violations += 1;
                    report.violations.push(ConsistencyViolation {
                        row: report.total_rows,
                        column: "timestamp",
                        value: ts_text.to_string(),
                        previous: last_ts_text.clone(),
                    });
                }
                last_ts = Some(ts);
                last_ts_text = ts_text.to_string();
            }
            None => last_ts = None,
        }
    }

    info!(
        "checked {} rows: {} value_id violations, {} timestamp violations",
        report.total_rows, report.value_id_violations, report.timestamp_violations
    );
    Ok(report)
}

/// Parse a timestamp field to epoch milliseconds.
///
/// Accepts epoch milliseconds, RFC 3339, and the common space-separated
/// datetime layouts (with or without fractional seconds). Naive datetimes
/// are taken as UTC.
pub fn parse_timestamp_ms(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    // Already epoch milliseconds.
    if let Ok(ms) = text.parse::<i64>() {
        return Some(ms);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }

    for format in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    // Date-only fields normalize to midnight.
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
    }

    None
}
