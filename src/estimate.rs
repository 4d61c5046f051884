//! Shear - Bytes-per-row estimation
//!
//! Serializes a bounded prefix of the dataset once and derives an estimated
//! cost per row, inflated by a small safety margin so initial chunk guesses
//! land under capacity more often than over it. The figure is a starting
//! guess only; final chunk boundaries are always decided against exact
//! measurements.

use crate::data::Dataset;
use crate::error::Result;
use crate::serializer::CsvSerializer;

/// Multiplicative inflation applied to the sampled bytes-per-row figure.
pub const SAFETY_MARGIN: f64 = 1.05;

/// Estimate the serialized cost of one row, in bytes.
///
/// The first `min(sample_rows, n)` rows are serialized as a single candidate
/// chunk, the measured size is divided by the sample row count, floored at
/// 1.0 byte per row, then multiplied by [`SAFETY_MARGIN`]. The sample buffer
/// is transient and released before this returns.
///
/// The dataset must be non-empty; callers short-circuit empty datasets
/// before estimation.
pub fn bytes_per_row(
    dataset: &Dataset,
    serializer: &CsvSerializer,
    sample_rows: usize,
) -> Result<f64> {
    debug_assert!(!dataset.is_empty());
    let sample = sample_rows.min(dataset.row_count()).max(1);

    let measured = serializer.measure(dataset.headers(), dataset.slice(0..sample))?;

    Ok((measured as f64 / sample as f64).max(1.0) * SAFETY_MARGIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize, width: usize) -> Dataset {
        let headers = vec!["v".to_string()];
        let rows = (0..n).map(|_| vec!["x".repeat(width)]).collect();
        Dataset::from_rows(headers, rows)
    }

    #[test]
    fn test_constant_rows() {
        // Header "v\n" = 2 bytes, each row = width + 1 bytes.
        let ds = dataset(100, 9);
        let est = bytes_per_row(&ds, &CsvSerializer::default(), 100).unwrap();
        let exact = (2.0 + 100.0 * 10.0) / 100.0;
        assert!((est - exact * SAFETY_MARGIN).abs() < 1e-9);
    }

    #[test]
    fn test_sample_clamped_to_dataset() {
        let ds = dataset(10, 9);
        let est = bytes_per_row(&ds, &CsvSerializer::default(), 5000).unwrap();
        let exact = (2.0 + 10.0 * 10.0) / 10.0;
        assert!((est - exact * SAFETY_MARGIN).abs() < 1e-9);
    }

    #[test]
    fn test_floor_one_byte_per_row() {
        // Empty values still serialize to one byte (the terminator), but the
        // floor guards the degenerate arithmetic regardless.
        let ds = Dataset::from_rows(vec![String::new()], vec![vec![String::new()]; 4]);
        let est = bytes_per_row(&ds, &CsvSerializer::default(), 4).unwrap();
        assert!(est >= SAFETY_MARGIN);
    }
}
