//! Shear - Memory-mapped dataset loading
//!
//! Maps the input file and parses it once into an ordered, immutable row
//! collection. Values are kept as opaque text; no type coercion happens at
//! any point, so what was read is exactly what gets written back out.

use std::fs::File;
use std::ops::Range;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{Result, SplitError};

/// An ordered, immutable collection of delimited rows.
///
/// A shared header record names the columns; each row is a vector of opaque
/// text values positionally aligned with the headers. Row order is
/// significant and preserved for the lifetime of the dataset.
#[derive(Debug)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Source path for display.
    pub path: String,
    /// Source size in bytes.
    pub size: u64,
}

impl Dataset {
    /// Load a delimited file into memory.
    ///
    /// The file is memory-mapped and parsed in a single pass with the given
    /// single-byte field delimiter. Fails with [`SplitError::NotFound`] if
    /// the path does not resolve to an existing regular file.
    pub fn load<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let path_ref = path.as_ref();
        if !path_ref.is_file() {
            return Err(SplitError::NotFound(path_ref.to_path_buf()));
        }

        let file = File::open(path_ref)?;
        let size = file.metadata()?.len();

        // A zero-length file cannot be mapped and holds no rows anyway.
        if size == 0 {
            return Ok(Self {
                headers: Vec::new(),
                rows: Vec::new(),
                path: path_ref.display().to_string(),
                size,
            });
        }

        // Mapping is instant regardless of file size; the csv reader then
        // parses straight out of the mapped bytes.
        let mmap = unsafe { Mmap::map(&file)? };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_reader(&mmap[..]);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        Ok(Self {
            headers,
            rows,
            path: path_ref.display().to_string(),
            size,
        })
    }

    /// Build a dataset from already-parsed rows.
    ///
    /// Useful for programmatic input that never touched a file.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            path: "<memory>".to_string(),
            size: 0,
        }
    }

    /// Column names, in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Total number of data rows (the header record is not a row).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the dataset holds zero data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, in order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// A contiguous slice of rows for the half-open range `[start, end)`.
    pub fn slice(&self, range: Range<usize>) -> &[Vec<String>] {
        &self.rows[range]
    }

    /// Get formatted file size string
    pub fn size_human(&self) -> String {
        human_bytes(self.size)
    }
}

/// Format a byte count for display.
pub fn human_bytes(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}
