//! Long-read post-processing: FASTA/FASTQ and PAF parsing, identity/coverage
//! filtering of alignments, and the report generators behind the
//! `stat_full_len`, `map_paf2reads` and `paf2reads` tools.

pub mod alignment_filtering;
pub mod cli;
pub mod configs;
pub mod error;
pub mod map_paf2reads;
pub mod paf;
pub mod paf2reads;
pub mod seq_reader;
pub mod stat_full_len;
pub mod tabular;
pub mod utils;

pub use error::{Error, Result};
