// DQBench Testdata - Fault injection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Data-quality fault injection.
//!
//! Three pure transforms over record chunks, applied in pipeline order:
//! noise and outliers first, then missing values, then availability delays.
//! Each transform touches exactly one quality dimension so scored defects can
//! be traced back to the fault that produced them.

use dqbench::record::{coerce_i64, ColumnIndex, RawRecord, REQUIRED_COLUMNS};
use log::info;
use rand::prelude::*;
use rand::seq::index::sample;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Testdata error types.
#[derive(Debug, Error)]
pub enum TestdataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid fault configuration: {0}")]
    InvalidConfig(String),
}

/// Fault injection parameters.
///
/// Defaults match the historical benchmark configuration: 5% relative noise,
/// 5% outliers at factor 2, 10% missing values, 4s validity with 20% of rows
/// pushed past it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FaultConfig {
    /// Relative standard deviation of Gaussian noise on `value`.
    pub deviation: f64,
    /// Multiplier applied (with random sign) to outlier rows.
    pub outlier_factor: f64,
    /// Fraction of rows turned into outliers.
    pub outlier_percentage: f64,
    /// Fraction of rows whose `value` is blanked.
    pub missing_percentage: f64,
    /// Upper bound (exclusive) of the normal availability delay, ms.
    pub validity_period: i64,
    /// Fraction of rows delayed past the validity period.
    pub outdated_percentage: f64,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            deviation: 0.05,
            outlier_factor: 2.0,
            outlier_percentage: 0.05,
            missing_percentage: 0.1,
            validity_period: 4_000,
            outdated_percentage: 0.2,
        }
    }
}

impl FaultConfig {
    /// Check the invariants: fractions in [0, 1], positive validity period.
    pub fn validate(&self) -> Result<(), TestdataError> {
        for (name, frac) in [
            ("outlier_percentage", self.outlier_percentage),
            ("missing_percentage", self.missing_percentage),
            ("outdated_percentage", self.outdated_percentage),
        ] {
            if !(0.0..=1.0).contains(&frac) {
                return Err(TestdataError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {frac}"
                )));
            }
        }
        if self.validity_period <= 0 {
            return Err(TestdataError::InvalidConfig(
                "validity_period must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Add Gaussian noise to every parseable `value` and turn a sampled fraction
/// of them into multiplicative outliers.
///
/// Noise sigma is `max(value * deviation, 1e-6)` per row. Outlier rows are
/// multiplied by `±outlier_factor` with a random sign. A chunk whose values
/// are all integral is rounded back to integers; otherwise values are rounded
/// to the maximum decimal precision observed in the chunk, so the degraded
/// file keeps the shape of the original.
pub fn inject_noise<R: Rng>(records: &mut [RawRecord], config: &FaultConfig, rng: &mut R) {
    // Indices of rows whose value parses; others pass through untouched.
    let mut parsed: Vec<(usize, f64)> = Vec::with_capacity(records.len());
    let mut max_decimals = 0usize;
    let mut all_integral = true;

    for (idx, record) in records.iter().enumerate() {
        if let Ok(v) = record.value.trim().parse::<f64>() {
            if !v.is_finite() {
                continue;
            }
            parsed.push((idx, v));
            let decimals = decimal_places(&record.value);
            max_decimals = max_decimals.max(decimals);
            if decimals > 0 || v.fract() != 0.0 {
                all_integral = false;
            }
        }
    }

    if parsed.is_empty() {
        return;
    }

    let mut noisy: Vec<f64> = parsed
        .iter()
        .map(|(_, v)| {
            let sigma = (v * config.deviation).max(1e-6);
            let noise = Normal::new(0.0, sigma).expect("sigma is positive and finite");
            v + noise.sample(rng)
        })
        .collect();

    let num_outliers = (config.outlier_percentage * noisy.len() as f64) as usize;
    if num_outliers > 0 {
        for idx in sample(rng, noisy.len(), num_outliers) {
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            noisy[idx] *= sign * config.outlier_factor;
        }
    }

    for (&(record_idx, _), value) in parsed.iter().zip(&noisy) {
        records[record_idx].value = if all_integral {
            format!("{}", value.round() as i64)
        } else {
            format!("{value:.prec$}", prec = max_decimals)
        };
    }
}

/// Blank `value` on a sampled fraction of rows.
pub fn inject_missing<R: Rng>(records: &mut [RawRecord], config: &FaultConfig, rng: &mut R) {
    let num_missing = (config.missing_percentage * records.len() as f64) as usize;
    if num_missing == 0 {
        return;
    }
    for idx in sample(rng, records.len(), num_missing) {
        records[idx].value = String::new();
    }
}

/// Rewrite `available_time` to simulate arrival delay.
///
/// Every row with a coercible timestamp gets `timestamp + U[0, validity)`;
/// a sampled `outdated_percentage` of those rows is pushed a further
/// `U[validity, 2*validity)` past it, guaranteeing a zero timeliness
/// contribution at a matching volatility. Rows whose timestamp does not
/// coerce keep their original `available_time`.
pub fn assign_availability<R: Rng>(records: &mut [RawRecord], config: &FaultConfig, rng: &mut R) {
    let validity = config.validity_period;
    let eligible: Vec<usize> = (0..records.len())
        .filter(|i| coerce_i64(&records[*i].timestamp).is_some())
        .collect();

    for &idx in &eligible {
        let ts = coerce_i64(&records[idx].timestamp).expect("filtered above");
        let delay = rng.gen_range(0..validity);
        records[idx].available_time = (ts + delay).to_string();
    }

    let num_outdated = (config.outdated_percentage * eligible.len() as f64) as usize;
    if num_outdated > 0 {
        for pick in sample(rng, eligible.len(), num_outdated) {
            let idx = eligible[pick];
            let current = coerce_i64(&records[idx].available_time).expect("set above");
            let extra = rng.gen_range(validity..validity * 2);
            records[idx].available_time = (current + extra).to_string();
        }
    }
}

/// Degrade a CSV file end to end: noise/outliers, missing values, then
/// availability delays, processed in bounded-memory chunks.
pub fn degrade_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &FaultConfig,
    chunk_size: usize,
    seed: Option<u64>,
) -> Result<usize, TestdataError> {
    config.validate()?;
    if chunk_size == 0 {
        return Err(TestdataError::InvalidConfig(
            "chunk_size must be positive".to_string(),
        ));
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(input.as_ref())?;
    let columns = ColumnIndex::from_headers(reader.headers()?).map_err(|e| match e {
        dqbench::DqError::MissingColumn(name) => TestdataError::MissingColumn(name),
        other => TestdataError::InvalidConfig(other.to_string()),
    })?;

    let mut writer = csv::Writer::from_path(output.as_ref())?;
    writer.write_record(REQUIRED_COLUMNS)?;

    let mut chunk: Vec<RawRecord> = Vec::with_capacity(chunk_size);
    let mut total = 0usize;
    let mut row = csv::StringRecord::new();

    loop {
        let more = reader.read_record(&mut row)?;
        if more {
            chunk.push(columns.extract(&row));
        }
        if chunk.len() == chunk_size || (!more && !chunk.is_empty()) {
            inject_noise(&mut chunk, config, &mut rng);
            inject_missing(&mut chunk, config, &mut rng);
            assign_availability(&mut chunk, config, &mut rng);
            for r in &chunk {
                writer.write_record([
                    r.value_id.as_str(),
                    r.sensor_id.as_str(),
                    r.value.as_str(),
                    r.timestamp.as_str(),
                    r.available_time.as_str(),
                ])?;
            }
            total += chunk.len();
            chunk.clear();
        }
        if !more {
            break;
        }
    }

    writer.flush()?;
    info!(
        "degraded {total} rows into {}",
        output.as_ref().display()
    );
    Ok(total)
}

/// Digits after the decimal point in a numeric text field.
fn decimal_places(text: &str) -> usize {
    match text.trim().split_once('.') {
        Some((_, frac)) => frac.len(),
        None => 0,
    }
}
