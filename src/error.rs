//! Shear - Error taxonomy
//!
//! Only genuine failures are errors: a missing input, a malformed input, or
//! an I/O failure during a probe or a write. An empty dataset and a single
//! row that alone exceeds the size cap are reported as facts, not errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("input file not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SplitError>;
