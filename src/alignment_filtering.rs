/// alignment filtering module
/// Two independent policies:
/// 1) AlignmentFilter: similarity of matched bases vs block length, and target coverage
/// 2) FullLengthFilter: query coverage, reference coverage and an unmapped-residual identity
///    estimate, used only by the full-length counter

use crate::configs::FilterThresholds;
use crate::error::Result;
use crate::paf::{FullLengthHit, PafRecord};
use crate::tabular::TabularRow;

/// A PAF record that passed the thresholds, with the metrics it was judged on
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredAlignment {
    pub record: PafRecord,
    pub similarity: f64,
    pub coverage: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub seen: u64,
    pub passed: u64,
    pub low_identity: u64,
    pub low_coverage: u64,
}

/// Iterator adapter that keeps the rows passing both thresholds
pub struct AlignmentFilter<I> {
    rows: I,
    thresholds: FilterThresholds,
    stats: FilterStats,
}

impl<I> AlignmentFilter<I>
where
    I: Iterator<Item = Result<TabularRow>>,
{
    pub fn new(rows: I, thresholds: FilterThresholds) -> Self {
        Self {
            rows,
            thresholds,
            stats: FilterStats::default(),
        }
    }

    pub fn stats(&self) -> FilterStats {
        self.stats
    }

    fn evaluate(&mut self, row: &TabularRow) -> Result<Option<FilteredAlignment>> {
        let mut record = PafRecord::from_row(row)?;
        record.normalize_coordinates();

        let similarity = record.similarity();
        let coverage = record
            .target_coverage()
            .ok_or_else(|| row.malformed("target length is zero"))?;
        self.stats.seen += 1;

        if similarity < self.thresholds.identity {
            self.stats.low_identity += 1;
            return Ok(None);
        }
        if coverage < self.thresholds.coverage {
            self.stats.low_coverage += 1;
            return Ok(None);
        }

        self.stats.passed += 1;
        Ok(Some(FilteredAlignment {
            record,
            similarity,
            coverage,
        }))
    }
}

impl<I> Iterator for AlignmentFilter<I>
where
    I: Iterator<Item = Result<TabularRow>>,
{
    type Item = Result<FilteredAlignment>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.rows.next()? {
                Ok(row) => row,
                Err(e) => return Some(Err(e)),
            };
            match self.evaluate(&row) {
                Ok(Some(alignment)) => return Some(Ok(alignment)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Minimum percent of the query that must be aligned for a full-length hit.
pub const MIN_QUERY_COVERAGE: f64 = 75.0;

/// Which full-length criterion a hit failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    QueryCoverage,
    TargetCoverage,
    Identity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FullLengthFilter {
    pub thresholds: FilterThresholds,
    pub min_query_coverage: f64,
}

impl FullLengthFilter {
    pub fn new(thresholds: FilterThresholds) -> Self {
        Self {
            thresholds,
            min_query_coverage: MIN_QUERY_COVERAGE,
        }
    }

    /// Judge a hit against the length of the reference it maps to.
    pub fn check(
        &self,
        hit: &FullLengthHit,
        reference_length: u64,
    ) -> std::result::Result<(), Rejection> {
        // query coverage
        let query_span = hit.query_span();
        let query_coverage = (query_span as f64) * 100.0 / (hit.query_length as f64);
        if query_coverage < self.min_query_coverage {
            return Err(Rejection::QueryCoverage);
        }

        // an empty reference cannot be covered
        if reference_length == 0 {
            return Err(Rejection::TargetCoverage);
        }
        let target_span = hit.target_span();
        let target_coverage = (target_span as f64) * 100.0 / (reference_length as f64);
        if target_coverage < self.thresholds.coverage {
            return Err(Rejection::TargetCoverage);
        }

        // unmapped residual between the two spans
        let unmapped = query_span.abs_diff(target_span);
        let estimate =
            (reference_length as f64 - unmapped as f64) * 100.0 / (reference_length as f64);
        if estimate < self.thresholds.identity {
            return Err(Rejection::Identity);
        }

        Ok(())
    }
}
