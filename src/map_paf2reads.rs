/// Trimmed read extractor
/// Alignments passing the identity/coverage filter are grouped per read, a side table
/// records every kept alignment, and each grouped read is written once per alignment,
/// trimmed to the aligned query interval plus padding.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};

use log::info;

use crate::alignment_filtering::{AlignmentFilter, FilteredAlignment};
use crate::configs::MapPaf2ReadsConfig;
use crate::error::{Error, Result};
use crate::seq_reader::{SequenceReader, SequenceRecord, write_fasta};
use crate::tabular::{Separator, TabularReader, TabularSource};
use crate::utils::trim_window;

/// One aligned query interval of a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadInterval {
    pub label: String,
    pub start: u64,
    pub end: u64,
}

/// Intervals per read id, in alignment order
#[derive(Debug, Default)]
pub struct ReadGroups {
    groups: HashMap<String, Vec<ReadInterval>>,
}

impl ReadGroups {
    /// Add an interval and return its label: the bare id first, then `<id>_1`, `<id>_2`, ...
    pub fn push(&mut self, id: &str, start: u64, end: u64) -> String {
        let group = self.groups.entry(id.to_string()).or_default();
        let label = if group.is_empty() {
            id.to_string()
        } else {
            format!("{}_{}", id, group.len())
        };
        group.push(ReadInterval {
            label: label.clone(),
            start,
            end,
        });
        label
    }

    pub fn get(&self, id: &str) -> Option<&[ReadInterval]> {
        self.groups.get(id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group passing alignments by query and write `label, similarity, coverage` rows to `stat`.
pub fn collect_groups<I, W>(alignments: I, stat: &mut W) -> Result<ReadGroups>
where
    I: Iterator<Item = Result<FilteredAlignment>>,
    W: Write,
{
    let mut groups = ReadGroups::default();
    for alignment in alignments {
        let alignment = alignment?;
        let record = &alignment.record;
        let label = groups.push(&record.query_name, record.query_start, record.query_end);
        writeln!(stat, "{}\t{:.2}\t{:.3}", label, alignment.similarity, alignment.coverage)
            .map_err(Error::output)?;
    }
    Ok(groups)
}

/// Write one trimmed FASTA record per interval of every grouped read; returns records written.
pub fn write_trimmed<I, W>(reads: I, groups: &ReadGroups, out: &mut W) -> Result<u64>
where
    I: Iterator<Item = Result<SequenceRecord>>,
    W: Write,
{
    let mut written = 0;
    for read in reads {
        let read = read?;
        let Some(intervals) = groups.get(&read.id) else {
            continue;
        };

        let sequence = read.sequence.as_bytes();
        for interval in intervals {
            let (from, to) = trim_window(interval.start, interval.end, sequence.len());
            write_fasta(out, &interval.label, &sequence[from..to]).map_err(Error::output)?;
            written += 1;
        }
    }
    Ok(written)
}

pub fn run<W: Write>(config: &MapPaf2ReadsConfig, out: &mut W) -> Result<()> {
    // resolve both inputs before anything is consumed
    let source = TabularSource::for_paf(&config.input_paf)?;
    let reads = SequenceReader::from_path(&config.reads, config.fastq_mode)?;

    let file = File::create(&config.stat).map_err(|e| Error::io(&config.stat, e))?;
    let mut stat = BufWriter::new(file);

    // filter alignments and group them per read
    let rows = TabularReader::open(&source, Separator::Char('\t'))?;
    let mut filter = AlignmentFilter::new(rows, config.thresholds);
    let groups = collect_groups(filter.by_ref(), &mut stat)?;
    stat.flush().map_err(|e| Error::io(&config.stat, e))?;

    // print summary
    let stats = filter.stats();
    info!("PAF filtering summary:");
    info!("  Alignments seen: {}", stats.seen);
    info!("  Identity filter skipped: {}", stats.low_identity);
    info!("  Coverage filter skipped: {}", stats.low_coverage);
    info!("  Alignments kept: {} across {} reads", stats.passed, groups.len());

    // second pass over the reads
    let written = write_trimmed(reads, &groups, out)?;
    out.flush().map_err(Error::output)?;
    info!("wrote {} trimmed reads", written);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paf::PafRecord;

    fn alignment(
        query: &str,
        start: u64,
        end: u64,
        similarity: f64,
        coverage: f64,
    ) -> Result<FilteredAlignment> {
        Ok(FilteredAlignment {
            record: PafRecord {
                query_name: query.to_string(),
                query_length: 1000,
                query_start: start,
                query_end: end,
                strand: '+',
                target_name: "ref1".to_string(),
                target_length: 1000,
                target_start: 0,
                target_end: 1000,
                num_matching: 900,
                alignment_block_length: 1000,
            },
            similarity,
            coverage,
        })
    }

    fn read(id: &str, sequence: &str) -> Result<SequenceRecord> {
        Ok(SequenceRecord {
            id: id.to_string(),
            sequence: sequence.to_string(),
        })
    }

    #[test]
    fn labels_count_up_within_each_read() {
        let mut groups = ReadGroups::default();
        assert_eq!(groups.push("r1", 0, 10), "r1");
        assert_eq!(groups.push("r2", 0, 10), "r2");
        assert_eq!(groups.push("r1", 20, 30), "r1_1");
        assert_eq!(groups.push("r1", 40, 50), "r1_2");
        let labels: Vec<_> = groups.get("r1").unwrap().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["r1", "r1_1", "r1_2"]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn stat_rows_follow_encounter_order() {
        let alignments = vec![
            alignment("r1", 0, 10, 96.938775, 90.0),
            alignment("r2", 0, 10, 100.0, 85.12345),
            alignment("r1", 20, 30, 80.0, 80.0),
        ];
        let mut stat = Vec::new();
        let groups = collect_groups(alignments.into_iter(), &mut stat).unwrap();
        assert_eq!(
            String::from_utf8(stat).unwrap(),
            "r1\t96.94\t90.000\nr2\t100.00\t85.123\nr1_1\t80.00\t80.000\n"
        );
        assert_eq!(groups.get("r1").unwrap().len(), 2);
    }

    #[test]
    fn trims_with_padding_and_clamps_to_read() {
        let mut groups = ReadGroups::default();
        groups.push("r1", 10, 20);
        groups.push("r1", 2, 28);
        groups.push("r2", 3, 1);

        let sequence = "ACGTACGTACGTACGTACGTACGTACGTAC";
        let reads = vec![read("r1", sequence), read("r2", "GGGGCCCC"), read("r3", "TTTT")];
        let mut out = Vec::new();
        let written = write_trimmed(reads.into_iter(), &groups, &mut out).unwrap();
        assert_eq!(written, 3);

        let expected = format!(
            ">r1\n{}\n>r1_1\n{}\n>r2\n{}\n",
            &sequence[5..25],
            &sequence[0..30],
            "GGGGCCCC"
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn trimmed_length_matches_clamped_window() {
        let len = 50usize;
        let sequence = "A".repeat(len);
        for (s, e) in [(0u64, 10u64), (4, 49), (5, 44), (20, 30), (45, 50)] {
            let mut groups = ReadGroups::default();
            groups.push("r", s, e);
            let mut out = Vec::new();
            write_trimmed(vec![read("r", &sequence)].into_iter(), &groups, &mut out).unwrap();
            let text = String::from_utf8(out).unwrap();
            let trimmed = text.lines().nth(1).unwrap();
            let expected = (len as u64).min(e + 5) - s.saturating_sub(5);
            assert_eq!(trimmed.len() as u64, expected);
        }
    }
}
