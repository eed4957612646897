/// PAF record model
/// Typed views over the fixed PAF columns. Each report generator reads its own subset
/// of columns, so the views are kept separate.

use crate::error::Result;
use crate::tabular::TabularRow;
use crate::utils::normalize;

pub const QUERY_NAME: usize = 0;
pub const QUERY_LENGTH: usize = 1;
pub const QUERY_START: usize = 2;
pub const QUERY_END: usize = 3;
pub const STRAND: usize = 4;
pub const TARGET_NAME: usize = 5;
pub const TARGET_LENGTH: usize = 6;
pub const TARGET_START: usize = 7;
pub const TARGET_END: usize = 8;
pub const NUM_MATCHING: usize = 9;
pub const ALIGNMENT_BLOCK_LENGTH: usize = 10;

/// Struct to hold the mandatory PAF columns, optional tags are ignored
#[derive(Debug, Clone, PartialEq)]
pub struct PafRecord {
    pub query_name: String,
    pub query_length: u64,
    pub query_start: u64,
    pub query_end: u64,
    pub strand: char,
    pub target_name: String,
    pub target_length: u64,
    pub target_start: u64,
    pub target_end: u64,
    pub num_matching: u64,
    pub alignment_block_length: u64,
}

impl PafRecord {
    pub fn from_row(row: &TabularRow) -> Result<Self> {
        Ok(Self {
            query_name: row.field(QUERY_NAME)?.to_string(),
            query_length: row.parse_field(QUERY_LENGTH)?,
            query_start: row.parse_field(QUERY_START)?,
            query_end: row.parse_field(QUERY_END)?,
            strand: row.field(STRAND)?.chars().next().unwrap_or('+'),
            target_name: row.field(TARGET_NAME)?.to_string(),
            target_length: row.parse_field(TARGET_LENGTH)?,
            target_start: row.parse_field(TARGET_START)?,
            target_end: row.parse_field(TARGET_END)?,
            num_matching: row.parse_field(NUM_MATCHING)?,
            alignment_block_length: row.parse_field(ALIGNMENT_BLOCK_LENGTH)?,
        })
    }

    /// Order both coordinate pairs as (min, max).
    pub fn normalize_coordinates(&mut self) {
        (self.query_start, self.query_end) = normalize(self.query_start, self.query_end);
        (self.target_start, self.target_end) = normalize(self.target_start, self.target_end);
    }

    /// Ratio of the smaller to the larger of matching bases and block length, in percent.
    pub fn similarity(&self) -> f64 {
        let low = self.num_matching.min(self.alignment_block_length);
        let high = self.num_matching.max(self.alignment_block_length);
        if high == 0 {
            return 0.0;
        }
        low as f64 * 100.0 / high as f64
    }

    /// Percent of the target spanned by the alignment, `None` for a zero-length target.
    pub fn target_coverage(&self) -> Option<f64> {
        if self.target_length == 0 {
            return None;
        }
        let span = self.target_end.abs_diff(self.target_start);
        Some(span as f64 * 100.0 / self.target_length as f64)
    }
}

/// The columns the full-length counter reads: query span and length, target name and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullLengthHit {
    pub query_length: u64,
    pub query_start: u64,
    pub query_end: u64,
    pub target_name: String,
    pub target_start: u64,
    pub target_end: u64,
}

impl FullLengthHit {
    /// Parse and normalize; a zero query length cannot be scored and is rejected.
    pub fn from_row(row: &TabularRow) -> Result<Self> {
        let query_length: u64 = row.parse_field(QUERY_LENGTH)?;
        if query_length == 0 {
            return Err(row.malformed("query length is zero"));
        }
        let (query_start, query_end) =
            normalize(row.parse_field(QUERY_START)?, row.parse_field(QUERY_END)?);
        let (target_start, target_end) =
            normalize(row.parse_field(TARGET_START)?, row.parse_field(TARGET_END)?);

        Ok(Self {
            query_length,
            query_start,
            query_end,
            target_name: row.field(TARGET_NAME)?.to_string(),
            target_start,
            target_end,
        })
    }

    /// Aligned query bases, counting both ends.
    pub fn query_span(&self) -> u64 {
        self.query_end - self.query_start + 1
    }

    pub fn target_span(&self) -> u64 {
        self.target_end - self.target_start + 1
    }
}
