// DQBench - Windowed data-quality scoring for sensor streams
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the DQBench core.

use thiserror::Error;

/// Main error type for scoring and reconciliation operations.
#[derive(Error, Debug)]
pub enum DqError {
    /// A required column is absent from the input stream.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Computed and reference series cannot be aligned.
    #[error("Series length mismatch: computed {computed} windows, reference {reference} rows")]
    LengthMismatch { computed: usize, reference: usize },

    /// A reference row does not carry the five expected columns.
    #[error("Reference row {row} has {found} columns, expected {expected}")]
    ReferenceArity {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for DQBench operations.
pub type Result<T> = std::result::Result<T, DqError>;
