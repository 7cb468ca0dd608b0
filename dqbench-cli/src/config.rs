// DQBench CLI - Configuration loading
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Benchmark configuration file.
//!
//! A single JSON file carries the scoring parameters and the fault-injection
//! profile. Absent file or absent fields fall back to defaults; the loaded
//! value is immutable and passed down by reference.

use dqbench::QualityConfig;
use dqbench_testdata::FaultConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Top-level benchmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Core scoring parameters.
    #[serde(default)]
    pub quality: QualityConfig,
    /// Fault-injection profile for `prepare`.
    #[serde(default)]
    pub faults: FaultConfig,
    /// Chunk size for file-rewriting pipelines.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            quality: QualityConfig::default(),
            faults: FaultConfig::default(),
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    30_000
}

impl BenchConfig {
    /// Load a configuration file, falling back to defaults when no path is
    /// given or the file does not exist. A malformed file is an error, not a
    /// silent fallback.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, serde_json::Error> {
        let Some(path) = path else {
            info!("no config file provided, using defaults");
            return Ok(Self::default());
        };

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("config file {} not readable ({e}), using defaults", path.display());
                return Ok(Self::default());
            }
        };

        info!("loading configuration from {}", path.display());
        serde_json::from_str(&text)
    }
}
