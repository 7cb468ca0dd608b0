// DQBench - Windowed data-quality scoring for sensor streams
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Core scoring configuration.
//!
//! The core needs exactly two parameters: the window size and the volatility
//! reference for timeliness decay. The configuration is an explicit immutable
//! value constructed once and passed by reference; there is no ambient global
//! state.

use crate::error::{DqError, Result};
use serde::{Deserialize, Serialize};

/// Parameters of the windowed quality scorer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Number of tuples per scored window.
    pub window_size: usize,
    /// Currency (ms) at which timeliness reaches zero.
    pub volatility: i64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            window_size: 50_000,
            volatility: 4_000,
        }
    }
}

impl QualityConfig {
    /// Create a config, validating both parameters.
    pub fn new(window_size: usize, volatility: i64) -> Result<Self> {
        let config = Self {
            window_size,
            volatility,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants: both parameters strictly positive.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(DqError::InvalidConfig(
                "window_size must be positive".to_string(),
            ));
        }
        if self.volatility <= 0 {
            return Err(DqError::InvalidConfig(
                "volatility must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
