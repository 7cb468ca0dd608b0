// DQBench Testdata - Clean stream generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Clean sensor stream generation.
//!
//! Generates single-sensor streams with strictly increasing `value_id` and
//! `timestamp` and `available_time == timestamp` (zero currency). Faults are
//! layered on afterwards by the `faults` module.

use dqbench::record::{RawRecord, REQUIRED_COLUMNS};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::io::Write;
use std::path::Path;

/// Configuration for clean stream generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Sensor identifier written into every row.
    pub sensor_id: String,
    /// Number of rows to generate.
    pub num_rows: usize,
    /// First `value_id`.
    pub start_value_id: u64,
    /// First timestamp, epoch milliseconds.
    pub start_time_ms: i64,
    /// Interval between rows, milliseconds.
    pub interval_ms: i64,
    /// Signal baseline.
    pub base_value: f64,
    /// Sine amplitude around the baseline.
    pub amplitude: f64,
    /// Sine period in milliseconds.
    pub period_ms: i64,
    /// Standard deviation of added Gaussian noise.
    pub noise_std: f64,
    /// Decimal places written for `value`.
    pub decimals: usize,
    /// Random seed for reproducibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sensor_id: "sensor_1".to_string(),
            num_rows: 1_000,
            start_value_id: 1,
            start_time_ms: 1_706_745_600_000, // 2024-02-01 00:00:00 UTC
            interval_ms: 1_000,
            base_value: 20.0,
            amplitude: 2.0,
            period_ms: 3_600_000, // 1 hour
            noise_std: 0.05,
            decimals: 3,
            seed: None,
        }
    }
}

impl StreamConfig {
    /// Create a config for the given sensor.
    pub fn new(sensor_id: impl Into<String>) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            ..Default::default()
        }
    }

    /// Set the row count.
    pub fn with_num_rows(mut self, n: usize) -> Self {
        self.num_rows = n;
        self
    }

    /// Set the first timestamp.
    pub fn with_start_time(mut self, timestamp_ms: i64) -> Self {
        self.start_time_ms = timestamp_ms;
        self
    }

    /// Set the sampling interval.
    pub fn with_interval_ms(mut self, interval_ms: i64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Set baseline, amplitude, and period of the sine signal.
    pub fn with_signal(mut self, base: f64, amplitude: f64, period_ms: i64) -> Self {
        self.base_value = base;
        self.amplitude = amplitude;
        self.period_ms = period_ms;
        self
    }

    /// Set the noise standard deviation.
    pub fn with_noise_std(mut self, std: f64) -> Self {
        self.noise_std = std;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generate the stream.
    pub fn generate(&self) -> Vec<RawRecord> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let noise = Normal::new(0.0, self.noise_std.max(f64::EPSILON))
            .expect("noise_std must be finite");

        (0..self.num_rows)
            .map(|i| {
                let ts = self.start_time_ms + i as i64 * self.interval_ms;
                let elapsed = (i as i64 * self.interval_ms) as f64;
                let phase = 2.0 * PI * elapsed / self.period_ms as f64;
                let value =
                    self.base_value + self.amplitude * phase.sin() + noise.sample(&mut rng);
                RawRecord::new(
                    (self.start_value_id + i as u64).to_string(),
                    self.sensor_id.clone(),
                    format!("{value:.prec$}", prec = self.decimals),
                    ts.to_string(),
                    ts.to_string(),
                )
            })
            .collect()
    }
}

/// Write records as CSV with the canonical header.
pub fn write_records_csv<W: Write>(
    writer: W,
    records: &[RawRecord],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(REQUIRED_COLUMNS)?;
    for r in records {
        csv_writer.write_record([
            r.value_id.as_str(),
            r.sensor_id.as_str(),
            r.value.as_str(),
            r.timestamp.as_str(),
            r.available_time.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write records to a CSV file.
pub fn write_records_file(
    path: impl AsRef<Path>,
    records: &[RawRecord],
) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path)?;
    write_records_csv(file, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dqbench::record::coerce_i64;

    #[test]
    fn test_generate_count_and_ordering() {
        let records = StreamConfig::new("s1")
            .with_num_rows(100)
            .with_seed(1)
            .generate();
        assert_eq!(records.len(), 100);

        // value_id and timestamp strictly increasing, zero currency.
        for pair in records.windows(2) {
            let id0 = coerce_i64(&pair[0].value_id).unwrap();
            let id1 = coerce_i64(&pair[1].value_id).unwrap();
            assert!(id1 > id0);
            let ts0 = coerce_i64(&pair[0].timestamp).unwrap();
            let ts1 = coerce_i64(&pair[1].timestamp).unwrap();
            assert!(ts1 > ts0);
        }
        for r in &records {
            assert_eq!(r.timestamp, r.available_time);
            assert!(!r.value.is_empty());
        }
    }

    #[test]
    fn test_seed_reproducibility() {
        let a = StreamConfig::new("s1").with_seed(9).generate();
        let b = StreamConfig::new("s1").with_seed(9).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_csv_header() {
        let records = StreamConfig::new("s1")
            .with_num_rows(2)
            .with_seed(1)
            .generate();
        let mut out = Vec::new();
        write_records_csv(&mut out, &records).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("value_id,sensor_id,value,timestamp,available_time"));
        assert_eq!(text.lines().count(), 3);
    }
}
