// DQBench - Windowed data-quality scoring for sensor streams
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Windowed reading of an unbounded tuple stream.
//!
//! `WindowReader` pulls rows one at a time from a CSV source and yields
//! fixed-size, non-overlapping windows in stream order. Memory stays bounded
//! to one window; a trailing run shorter than the window size is discarded,
//! never yielded. The schema check runs once, lazily, when the first window
//! is requested.

use crate::error::{DqError, Result};
use crate::record::{ColumnIndex, RawRecord};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Lazy iterator over exact-size windows of sensor records.
pub struct WindowReader<R: Read> {
    reader: csv::Reader<R>,
    window_size: usize,
    columns: Option<ColumnIndex>,
    done: bool,
}

impl WindowReader<File> {
    /// Open a CSV file for windowed reading.
    pub fn open(path: impl AsRef<Path>, window_size: usize) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(file, window_size)
    }
}

impl<R: Read> WindowReader<R> {
    /// Create a windowed reader over any CSV source.
    ///
    /// `window_size` must be positive.
    pub fn new(source: R, window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(DqError::InvalidConfig(
                "window_size must be positive".to_string(),
            ));
        }

        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        Ok(Self {
            reader,
            window_size,
            columns: None,
            done: false,
        })
    }

    /// Resolve the column index from the header row, once.
    fn columns(&mut self) -> Result<ColumnIndex> {
        if let Some(columns) = self.columns {
            return Ok(columns);
        }
        let headers = self.reader.headers()?.clone();
        let columns = ColumnIndex::from_headers(&headers)?;
        self.columns = Some(columns);
        Ok(columns)
    }

    /// Pull the next full window, or None when the stream is exhausted.
    ///
    /// A trailing partial window is dropped here and logged at debug level.
    fn next_window(&mut self) -> Result<Option<Vec<RawRecord>>> {
        if self.done {
            return Ok(None);
        }

        let columns = self.columns()?;
        let mut window = Vec::with_capacity(self.window_size);
        let mut row = csv::StringRecord::new();

        while window.len() < self.window_size {
            if !self.reader.read_record(&mut row)? {
                self.done = true;
                if !window.is_empty() {
                    debug!(
                        "dropping trailing partial window of {} rows",
                        window.len()
                    );
                }
                return Ok(None);
            }
            window.push(columns.extract(&row));
        }

        Ok(Some(window))
    }
}

impl<R: Read> Iterator for WindowReader<R> {
    type Item = Result<Vec<RawRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_window() {
            Ok(Some(window)) => Some(Ok(window)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
