/// Full-length read counter
/// Loads reference lengths, streams the PAF through the full-length policy and
/// reports a hit count for every reference, including those without hits.

use std::collections::HashMap;
use std::io::Write;

use log::info;

use crate::alignment_filtering::{FullLengthFilter, Rejection};
use crate::configs::StatFullLenConfig;
use crate::error::{Error, Result};
use crate::paf::{FullLengthHit, TARGET_NAME};
use crate::seq_reader::{SequenceReader, SequenceRecord};
use crate::tabular::{Separator, TabularReader, TabularRow};
use crate::utils::format_count;

/// Reference lengths in first-seen order; a repeated id keeps its slot and takes the later length.
#[derive(Debug, Default)]
pub struct SequenceLengths {
    order: Vec<String>,
    lengths: HashMap<String, u64>,
}

impl SequenceLengths {
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: Iterator<Item = Result<SequenceRecord>>,
    {
        let mut lengths = Self::default();
        for record in records {
            let record = record?;
            let length = record.sequence.len() as u64;
            lengths.insert(record.id, length);
        }
        Ok(lengths)
    }

    pub fn insert(&mut self, id: String, length: u64) {
        if let Some(existing) = self.lengths.get_mut(&id) {
            *existing = length;
            return;
        }
        self.order.push(id.clone());
        self.lengths.insert(id, length);
    }

    pub fn get(&self, id: &str) -> Option<u64> {
        self.lengths.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.order
            .iter()
            .map(|id| (id.as_str(), self.lengths[id.as_str()]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Default)]
struct FullLengthSummary {
    unknown_reference: u64,
    query_coverage_skipped: u64,
    target_coverage_skipped: u64,
    identity_skipped: u64,
    counted: u64,
}

/// Count hits per reference that pass the full-length policy.
pub fn count_full_length<I>(
    rows: I,
    references: &SequenceLengths,
    filter: &FullLengthFilter,
) -> Result<HashMap<String, u64>>
where
    I: Iterator<Item = Result<TabularRow>>,
{
    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut summary = FullLengthSummary::default();

    for row in rows {
        let row = row?;

        // unknown references are skipped before any other column is looked at
        let Some(reference_length) = references.get(row.field(TARGET_NAME)?) else {
            summary.unknown_reference += 1;
            continue;
        };

        // apply full-length policy
        let hit = FullLengthHit::from_row(&row)?;
        match filter.check(&hit, reference_length) {
            Ok(()) => {
                info!("{}", row.fields.join("\t"));
                summary.counted += 1;
                *counts.entry(hit.target_name).or_insert(0) += 1;
            }
            Err(Rejection::QueryCoverage) => summary.query_coverage_skipped += 1,
            Err(Rejection::TargetCoverage) => summary.target_coverage_skipped += 1,
            Err(Rejection::Identity) => summary.identity_skipped += 1,
        }
    }

    // print summary
    info!("Full-length filtering summary:");
    info!("  Unknown reference skipped: {}", summary.unknown_reference);
    info!("  Query coverage filter skipped: {}", summary.query_coverage_skipped);
    info!("  Reference coverage filter skipped: {}", summary.target_coverage_skipped);
    info!("  Identity filter skipped: {}", summary.identity_skipped);
    info!("  Full-length reads counted: {}", summary.counted);

    Ok(counts)
}

/// Write the two-column table, one row per reference in reference order.
pub fn write_report<W: Write>(
    out: &mut W,
    references: &SequenceLengths,
    counts: &HashMap<String, u64>,
) -> std::io::Result<()> {
    writeln!(out, "#Reference id\tReads number")?;
    for (id, _) in references.iter() {
        let count = counts.get(id).copied().unwrap_or(0);
        writeln!(out, "{}\t{}", id, format_count(count))?;
    }
    Ok(())
}

pub fn run<W: Write>(config: &StatFullLenConfig, out: &mut W) -> Result<()> {
    // reference lengths, in file order
    let records = SequenceReader::from_path(&config.reference, config.fastq_mode)?;
    let references = SequenceLengths::from_records(records)?;
    info!("loaded {} reference sequences", references.len());

    // count hits, then report every reference
    let rows = TabularReader::from_path(&config.paf, Separator::Char('\t'))?;
    let counts = count_full_length(rows, &references, &FullLengthFilter::new(config.thresholds))?;

    write_report(out, &references, &counts).map_err(Error::output)?;
    out.flush().map_err(Error::output)
}
