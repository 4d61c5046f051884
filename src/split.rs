//! Shear - File splitting orchestration
//!
//! Ties the pieces together: load the dataset once, estimate bytes per row
//! from a bounded sample, then drive the partitioner chunk by chunk and
//! persist each accepted chunk as a numbered part file. Already-completed
//! parts survive a mid-run failure; only the in-progress file is cleaned up.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::data::Dataset;
use crate::error::{Result, SplitError};
use crate::estimate;
use crate::partition::Partitioner;
use crate::serializer::{CsvSerializer, DEFAULT_DELIMITER};

/// Fallback output extension when the input path has none.
const DEFAULT_EXTENSION: &str = "csv";

/// Tuning knobs for a split run. All fields have defaults matching the
/// 5 MB / 5000-row sampling configuration.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Cap per output file, in MB.
    pub max_mb: u64,
    /// Rows sampled to estimate bytes per row.
    pub sample_rows: usize,
    /// Output directory (default: a `{input_stem}_split` sibling).
    pub output_dir: Option<PathBuf>,
    /// Base name for part files (default: the input file stem).
    pub base_name: Option<String>,
    /// Field delimiter for input and output.
    pub delimiter: u8,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            max_mb: 5,
            sample_rows: 5000,
            output_dir: None,
            base_name: None,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl SplitOptions {
    pub fn max_mb(mut self, mb: u64) -> Self {
        self.max_mb = mb;
        self
    }

    pub fn sample_rows(mut self, rows: usize) -> Self {
        self.sample_rows = rows;
        self
    }

    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn base_name<S: Into<String>>(mut self, name: S) -> Self {
        self.base_name = Some(name.into());
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// One written output file.
#[derive(Debug, Clone, Serialize)]
pub struct PartFile {
    /// Where the part was written.
    pub path: PathBuf,
    /// Data rows in the part (header excluded).
    pub rows: usize,
    /// Exact size of the part on disk.
    pub bytes: u64,
    /// True when the part is a single row whose serialized size alone
    /// exceeds the cap.
    pub oversized: bool,
}

/// Ordered outcome of one split run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitReport {
    pub parts: Vec<PartFile>,
    pub total_rows: usize,
}

impl SplitReport {
    /// Ordered list of written file paths (empty if the source had no rows).
    pub fn paths(&self) -> Vec<PathBuf> {
        self.parts.iter().map(|p| p.path.clone()).collect()
    }

    /// True if any part had to exceed the cap.
    pub fn has_oversized(&self) -> bool {
        self.parts.iter().any(|p| p.oversized)
    }
}

/// Split a delimited file into parts no larger than `options.max_mb` each.
///
/// Parts are written to the output directory (created if absent) as
/// `{base_name}_part_{index:03}.{ext}` with `index` starting at 1, using the
/// same delimiter and encoding as the input. An input with zero data rows
/// produces an empty report and writes no files.
pub fn split_to_max_size<P: AsRef<Path>>(input: P, options: &SplitOptions) -> Result<SplitReport> {
    let input = input.as_ref();
    if !input.is_file() {
        return Err(SplitError::NotFound(input.to_path_buf()));
    }

    let max_bytes = options.max_mb * 1024 * 1024;

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    let base_name = options.base_name.clone().unwrap_or_else(|| stem.clone());

    let output_dir = match &options.output_dir {
        Some(dir) => dir.clone(),
        None => input
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(format!("{stem}_split")),
    };
    fs::create_dir_all(&output_dir)?;

    let serializer = CsvSerializer::new(options.delimiter);
    let dataset = Dataset::load(input, options.delimiter)?;
    if dataset.is_empty() {
        return Ok(SplitReport::default());
    }

    let bytes_per_row = estimate::bytes_per_row(&dataset, &serializer, options.sample_rows)?;
    debug!(
        source = %dataset.path,
        size = %dataset.size_human(),
        rows = dataset.row_count(),
        bytes_per_row,
        max_bytes,
        "starting split"
    );

    let mut partitioner = Partitioner::new(&dataset, &serializer, max_bytes, bytes_per_row);
    let mut parts = Vec::new();
    let mut index = 1usize;

    while let Some(chunk) = partitioner.next_chunk()? {
        let path = output_dir.join(format!("{base_name}_part_{index:03}.{ext}"));
        let bytes = serializer.persist(
            dataset.headers(),
            dataset.slice(chunk.start..chunk.end),
            &path,
        )?;

        let oversized = bytes > max_bytes;
        if oversized {
            warn!(
                path = %path.display(),
                bytes,
                max_bytes,
                "single row exceeds the size cap; emitted as-is"
            );
        }

        parts.push(PartFile {
            path,
            rows: chunk.row_count(),
            bytes,
            oversized,
        });
        index += 1;
    }

    Ok(SplitReport {
        parts,
        total_rows: dataset.row_count(),
    })
}
