//! Shear - Single-path serialization
//!
//! One encoding routine feeds both the byte-length probes and the persisted
//! output files, so the size measured during partitioning is byte-for-byte
//! the size that ends up on disk. Probes serialize into a transient
//! in-memory buffer; nothing is written to the filesystem until a chunk
//! boundary is final.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Default field delimiter for input and output files.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Encodes header + rows into the fixed output format: configurable
/// single-byte delimiter, UTF-8, LF record terminator, minimal quoting.
pub struct CsvSerializer {
    delimiter: u8,
}

impl Default for CsvSerializer {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl CsvSerializer {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Serialize the header record followed by the given rows.
    ///
    /// This is the only encoding routine in the crate; `measure` and
    /// `persist` both go through it.
    pub fn encode(&self, headers: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(self.delimiter)
                .from_writer(&mut buf);

            writer.write_record(headers)?;
            for row in rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        Ok(buf)
    }

    /// Exact serialized byte size of header + rows.
    ///
    /// The probe buffer is dropped on return; no artifact outlives the call.
    pub fn measure(&self, headers: &[String], rows: &[Vec<String>]) -> Result<u64> {
        Ok(self.encode(headers, rows)?.len() as u64)
    }

    /// Serialize header + rows to `dest` and return the written byte count.
    ///
    /// On a write failure the partial output file is removed before the
    /// error propagates; previously written files are untouched.
    pub fn persist(&self, headers: &[String], rows: &[Vec<String>], dest: &Path) -> Result<u64> {
        let buf = self.encode(headers, rows)?;
        if let Err(e) = fs::write(dest, &buf) {
            let _ = fs::remove_file(dest);
            return Err(e.into());
        }
        Ok(buf.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SplitError;
    use tempfile::TempDir;

    fn headers() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    fn rows(n: usize) -> Vec<Vec<String>> {
        (0..n)
            .map(|i| vec![format!("x{i}"), format!("y{i}")])
            .collect()
    }

    #[test]
    fn test_encode_exact_bytes() {
        let s = CsvSerializer::default();
        let buf = s.encode(&headers(), &rows(2)).unwrap();
        assert_eq!(buf, b"a;b\nx0;y0\nx1;y1\n");
    }

    #[test]
    fn test_measure_matches_encode() {
        let s = CsvSerializer::default();
        let buf = s.encode(&headers(), &rows(3)).unwrap();
        let measured = s.measure(&headers(), &rows(3)).unwrap();
        assert_eq!(measured, buf.len() as u64);
    }

    #[test]
    fn test_persist_is_byte_identical_to_measure() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.csv");

        let s = CsvSerializer::default();
        let measured = s.measure(&headers(), &rows(5)).unwrap();
        let written = s.persist(&headers(), &rows(5), &dest).unwrap();

        assert_eq!(written, measured);
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), measured);
        assert_eq!(std::fs::read(&dest).unwrap(), s.encode(&headers(), &rows(5)).unwrap());
    }

    #[test]
    fn test_quoting_only_when_needed() {
        let s = CsvSerializer::default();
        let row = vec![vec!["plain".to_string(), "with;delim".to_string()]];
        let buf = s.encode(&headers(), &row).unwrap();
        assert_eq!(buf, b"a;b\nplain;\"with;delim\"\n");
    }

    #[test]
    fn test_persist_failure_leaves_no_partial_output() {
        let dir = TempDir::new().unwrap();
        let s = CsvSerializer::default();

        // A completed part from an earlier chunk.
        let prior = dir.path().join("data_part_001.csv");
        s.persist(&headers(), &rows(2), &prior).unwrap();
        let prior_bytes = std::fs::read(&prior).unwrap();

        // The next destination cannot be written: its parent does not exist.
        let blocked = dir.path().join("missing").join("data_part_002.csv");
        let err = s.persist(&headers(), &rows(2), &blocked).unwrap_err();
        assert!(matches!(err, SplitError::Io(_)));
        assert!(!blocked.exists());

        // The earlier part is untouched.
        assert_eq!(std::fs::read(&prior).unwrap(), prior_bytes);
    }

    #[test]
    fn test_persist_onto_directory_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let s = CsvSerializer::default();

        // fs::write cannot replace an existing directory.
        let blocked = dir.path().join("taken");
        std::fs::create_dir(&blocked).unwrap();

        let err = s.persist(&headers(), &rows(1), &blocked).unwrap_err();
        assert!(matches!(err, SplitError::Io(_)));
        assert!(blocked.is_dir());
    }

    #[test]
    fn test_custom_delimiter() {
        let s = CsvSerializer::new(b',');
        let buf = s.encode(&headers(), &rows(1)).unwrap();
        assert_eq!(buf, b"a,b\nx0,y0\n");
    }
}
