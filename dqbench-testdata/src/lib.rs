// DQBench Testdata - Synthetic streams and fault injection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # DQBench Testdata
//!
//! Synthetic sensor stream generation and data-quality fault injection for
//! the DQBench ecosystem.
//!
//! This crate produces the degraded inputs the scoring engine is evaluated
//! on:
//!
//! - **Clean streams**: sine-plus-noise signals with strictly increasing
//!   `value_id` and `timestamp`, seeded for reproducibility
//! - **Fault injection**: Gaussian noise and multiplicative outliers, missing
//!   values, and availability delays (staleness)
//!
//! ## Quick Start
//!
//! ```rust
//! use dqbench_testdata::{FaultConfig, StreamConfig};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! // Generate a clean stream
//! let mut records = StreamConfig::new("sensor_7")
//!     .with_num_rows(1000)
//!     .with_seed(42)
//!     .generate();
//!
//! // Degrade it
//! let faults = FaultConfig::default();
//! let mut rng = StdRng::seed_from_u64(42);
//! dqbench_testdata::inject_noise(&mut records, &faults, &mut rng);
//! dqbench_testdata::inject_missing(&mut records, &faults, &mut rng);
//! dqbench_testdata::assign_availability(&mut records, &faults, &mut rng);
//! ```

pub mod faults;
pub mod generator;

// Re-exports for convenience
pub use faults::{
    assign_availability, degrade_file, inject_missing, inject_noise, FaultConfig, TestdataError,
};
pub use generator::{write_records_csv, StreamConfig};
