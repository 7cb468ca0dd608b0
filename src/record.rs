// DQBench - Windowed data-quality scoring for sensor streams
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Raw sensor records and per-field coercion.
//!
//! Every field is kept as text as read from the stream. Numeric coercion is
//! deferred to the scorer that needs it: accuracy coerces `value` to f64
//! (failures become NaN), completeness inspects the raw text, timeliness
//! coerces the two time columns to integers (failures exclude the row).

use crate::error::{DqError, Result};
use csv::StringRecord;

/// Columns every input stream must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "value_id",
    "sensor_id",
    "value",
    "timestamp",
    "available_time",
];

/// A single sensor reading, text-typed as read from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Monotonically increasing identity within one sensor's stream.
    pub value_id: String,
    /// Sensor identifier.
    pub sensor_id: String,
    /// Measured value; empty string means missing.
    pub value: String,
    /// Logical event time, epoch milliseconds.
    pub timestamp: String,
    /// Time the tuple became visible to processing, epoch milliseconds.
    pub available_time: String,
}

/// Resolved positions of the required columns within a header row.
#[derive(Debug, Clone, Copy)]
pub struct ColumnIndex {
    pub value_id: usize,
    pub sensor_id: usize,
    pub value: usize,
    pub timestamp: usize,
    pub available_time: usize,
}

impl ColumnIndex {
    /// Resolve column positions from a header row.
    ///
    /// Fails with `MissingColumn` naming the first absent required column.
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DqError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            value_id: find("value_id")?,
            sensor_id: find("sensor_id")?,
            value: find("value")?,
            timestamp: find("timestamp")?,
            available_time: find("available_time")?,
        })
    }

    /// Extract a record from a data row using the resolved positions.
    ///
    /// Fields past the end of a short row read as empty.
    pub fn extract(&self, row: &StringRecord) -> RawRecord {
        let get = |idx: usize| row.get(idx).unwrap_or("").to_string();
        RawRecord {
            value_id: get(self.value_id),
            sensor_id: get(self.sensor_id),
            value: get(self.value),
            timestamp: get(self.timestamp),
            available_time: get(self.available_time),
        }
    }
}

impl RawRecord {
    /// Build a record from the canonical column order.
    pub fn new(
        value_id: impl Into<String>,
        sensor_id: impl Into<String>,
        value: impl Into<String>,
        timestamp: impl Into<String>,
        available_time: impl Into<String>,
    ) -> Self {
        Self {
            value_id: value_id.into(),
            sensor_id: sensor_id.into(),
            value: value.into(),
            timestamp: timestamp.into(),
            available_time: available_time.into(),
        }
    }

    /// Numeric view of `value`; missing or unparseable text becomes NaN.
    pub fn value_f64(&self) -> f64 {
        coerce_f64(&self.value)
    }

    /// Delay between availability and event time, if both columns coerce.
    pub fn currency_ms(&self) -> Option<i64> {
        let ts = coerce_i64(&self.timestamp)?;
        let avail = coerce_i64(&self.available_time)?;
        Some(avail - ts)
    }
}

/// Coerce text to f64; empty or unparseable input yields NaN.
pub fn coerce_f64(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Coerce text to i64; empty or unparseable input yields None.
pub fn coerce_i64(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_f64_valid() {
        assert_eq!(coerce_f64("3.25"), 3.25);
        assert_eq!(coerce_f64(" -7 "), -7.0);
    }

    #[test]
    fn test_coerce_f64_missing_is_nan() {
        assert!(coerce_f64("").is_nan());
        assert!(coerce_f64("n/a").is_nan());
    }

    #[test]
    fn test_coerce_i64() {
        assert_eq!(coerce_i64("1700000000000"), Some(1_700_000_000_000));
        assert_eq!(coerce_i64("12.5"), None);
        assert_eq!(coerce_i64(""), None);
    }

    #[test]
    fn test_column_index_resolution() {
        let headers = StringRecord::from(vec![
            "value_id",
            "sensor_id",
            "value",
            "timestamp",
            "available_time",
        ]);
        let idx = ColumnIndex::from_headers(&headers).unwrap();
        assert_eq!(idx.value, 2);
        assert_eq!(idx.available_time, 4);
    }

    #[test]
    fn test_column_index_reordered_headers() {
        let headers = StringRecord::from(vec![
            "timestamp",
            "value",
            "available_time",
            "value_id",
            "sensor_id",
        ]);
        let idx = ColumnIndex::from_headers(&headers).unwrap();
        let row = StringRecord::from(vec!["100", "21.5", "150", "1", "s1"]);
        let record = idx.extract(&row);
        assert_eq!(record.value_id, "1");
        assert_eq!(record.value, "21.5");
        assert_eq!(record.timestamp, "100");
        assert_eq!(record.available_time, "150");
    }

    #[test]
    fn test_missing_column_reported() {
        let headers = StringRecord::from(vec!["value_id", "sensor_id", "value", "timestamp"]);
        let err = ColumnIndex::from_headers(&headers).unwrap_err();
        match err {
            DqError::MissingColumn(name) => assert_eq!(name, "available_time"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_currency() {
        let r = RawRecord::new("1", "s1", "20.0", "1000", "1500");
        assert_eq!(r.currency_ms(), Some(500));

        let bad = RawRecord::new("2", "s1", "20.0", "", "1500");
        assert_eq!(bad.currency_ms(), None);
    }
}
