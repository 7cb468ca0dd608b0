// DQBench - Windowed data-quality scoring for sensor streams
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # DQBench
//!
//! Windowed data-quality scoring and benchmarking for IoT sensor streams.
//!
//! DQBench consumes a stream of timestamped sensor tuples, partitions it into
//! fixed-size non-overlapping windows, and scores three quality dimensions
//! per window:
//!
//! - **Accuracy**: MAD-based outlier and missing-value detection
//! - **Completeness**: present-value ratio at the text layer
//! - **Timeliness**: linear delay decay against a volatility reference
//!
//! The resulting score series can be reconciled against an externally
//! produced reference table with a two-decimal tolerance, and engine interval
//! logs can be measured for latency and throughput.
//!
//! ## Quick Start
//!
//! ```rust
//! use dqbench::{score_stream, QualityConfig};
//!
//! let csv = "\
//! value_id,sensor_id,value,timestamp,available_time
//! 1,s1,20.0,1000,1000
//! 2,s1,20.1,2000,2500
//! 3,s1,,3000,3100
//! 4,s1,19.9,4000,4200";
//!
//! let config = QualityConfig::new(4, 4000).unwrap();
//! let scores = score_stream(csv.as_bytes(), &config).unwrap();
//! assert_eq!(scores.len(), 1);
//! assert_eq!(scores[0].completeness, 0.75);
//! ```
//!
//! ## Pipeline
//!
//! Raw tuple stream → [`WindowReader`] → accuracy/completeness/timeliness
//! scorers → [`WindowScore`] series → [`compare_scores`] against a reference
//! series → [`DifferenceReport`].
//!
//! The pipeline is single-threaded and fully sequential; windowing is a
//! bounded-memory reading technique, not a concurrency mechanism. Each
//! window's scoring is a pure function of its own rows.

pub mod accuracy;
pub mod benchmark;
pub mod compare;
pub mod completeness;
pub mod config;
pub mod error;
pub mod record;
pub mod score;
pub mod timeliness;
pub mod window;

// Re-exports for convenience
pub use accuracy::{score_accuracy, AccuracyStats};
pub use benchmark::{measure_interval_file, measure_intervals, summarize_runs, RunSummary};
pub use compare::{
    compare_scores, read_reference, read_reference_file, DifferenceReport, DiffRow,
    ReferenceRecord, DEFAULT_TOLERANCE,
};
pub use completeness::{score_completeness, CompletenessStats};
pub use config::QualityConfig;
pub use error::{DqError, Result};
pub use record::{RawRecord, REQUIRED_COLUMNS};
pub use score::{score_file, score_stream, score_window, write_scores, WindowScore};
pub use timeliness::score_timeliness;
pub use window::WindowReader;
