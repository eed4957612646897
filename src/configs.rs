use std::path::PathBuf;

use crate::seq_reader::FastqMode;

/// Identity and coverage thresholds, both in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterThresholds {
    pub identity: f64,
    pub coverage: f64,
}

pub struct StatFullLenConfig {
    pub reference: PathBuf,
    pub paf: PathBuf,
    pub thresholds: FilterThresholds,
    pub fastq_mode: FastqMode,
}

pub struct MapPaf2ReadsConfig {
    /// Empty reads the alignments from standard input.
    pub input_paf: String,
    pub reads: PathBuf,
    pub stat: PathBuf,
    pub thresholds: FilterThresholds,
    pub fastq_mode: FastqMode,
}

pub struct Paf2ReadsConfig {
    pub input_paf: String,
    pub reads: PathBuf,
    pub fastq_mode: FastqMode,
}
