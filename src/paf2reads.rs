/// Read subset extractor
/// Writes every read whose id appears as a query in the alignment file, unmodified.

use std::collections::HashSet;
use std::io::Write;

use log::info;

use crate::configs::Paf2ReadsConfig;
use crate::error::{Error, Result};
use crate::paf::QUERY_NAME;
use crate::seq_reader::{SequenceReader, SequenceRecord};
use crate::tabular::{Separator, TabularReader, TabularRow, TabularSource};

/// Distinct query ids (first column) of an alignment stream.
pub fn collect_query_ids<I>(rows: I) -> Result<HashSet<String>>
where
    I: Iterator<Item = Result<TabularRow>>,
{
    let mut ids = HashSet::new();
    for row in rows {
        let row = row?;
        ids.insert(row.field(QUERY_NAME)?.to_string());
    }
    Ok(ids)
}

/// Write the reads whose id is in `ids`; returns records written.
pub fn write_subset<I, W>(reads: I, ids: &HashSet<String>, out: &mut W) -> Result<u64>
where
    I: Iterator<Item = Result<SequenceRecord>>,
    W: Write,
{
    let mut written = 0;
    for read in reads {
        let read = read?;
        if !ids.contains(&read.id) {
            continue;
        }
        read.write_fasta(out).map_err(Error::output)?;
        written += 1;
    }
    Ok(written)
}

pub fn run<W: Write>(config: &Paf2ReadsConfig, out: &mut W) -> Result<()> {
    let source = TabularSource::for_paf(&config.input_paf)?;
    let reads = SequenceReader::from_path(&config.reads, config.fastq_mode)?;

    // ids first, then one pass over the reads
    let ids = collect_query_ids(TabularReader::open(&source, Separator::Char('\t'))?)?;
    info!("found {} distinct reads in {}", ids.len(), source.name());

    let written = write_subset(reads, &ids, out)?;
    out.flush().map_err(Error::output)?;
    info!("wrote {} reads", written);

    Ok(())
}
