//! Shear — exact size-capped splitting for delimited datasets.
//!
//! Splits a delimited tabular file into the minimal ordered sequence of
//! contiguous part files, each no larger than a hard byte cap. Chunk sizing
//! starts from a sampled bytes-per-row estimate and is settled by exact
//! serialization probes with binary-search refinement, so the cap is
//! enforced against real byte counts, never against guesses.
//!
//! The probe path and the output path share one encoding routine, which
//! makes measured and written sizes byte-identical by construction. The one
//! deliberate exception to the cap: a single row whose serialized size alone
//! exceeds it is emitted as its own part rather than stalling the split.

pub mod data;
pub mod error;
pub mod estimate;
pub mod partition;
pub mod serializer;
pub mod split;
