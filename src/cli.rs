use std::io::Write;

use clap::{Args, Parser};

use crate::configs::{FilterThresholds, MapPaf2ReadsConfig, Paf2ReadsConfig, StatFullLenConfig};
use crate::seq_reader::FastqMode;

/// Options shared by every tool
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Verbosity level (0 = error, 1 = info, 2 = debug)
    #[arg(short, long, default_value_t = 1)]
    pub verbose: u8,

    /// Split FASTQ records by sniffing '@' headers, as older releases did
    #[arg(long)]
    pub legacy_fastq: bool,
}

impl CommonArgs {
    pub fn fastq_mode(&self) -> FastqMode {
        if self.legacy_fastq {
            FastqMode::Legacy
        } else {
            FastqMode::Strict
        }
    }
}

/// Set up stderr logging as `[LEVEL] message`.
pub fn init_logging(verbose: u8) {
    env_logger::Builder::new()
        .filter_level(match verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

#[derive(Parser, Debug)]
#[command(
    name = "stat_full_len",
    version,
    about = "Count the number of full-length reads with reference pairs",
    after_help = "Example:\n    stat_full_len ref.fa -p map.paf >map.stat"
)]
pub struct StatFullLenArgs {
    /// Reference sequences in fasta or fastq format
    pub reference: String,

    /// Alignments in paf format
    #[arg(short, long)]
    pub paf: String,

    /// Minimum identity estimate, in percent
    #[arg(long = "identity", visible_alias = "id", default_value_t = 80.0)]
    pub identity: f64,

    /// Minimum reference coverage, in percent
    #[arg(short, long, default_value_t = 80.0)]
    pub coverage: f64,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl From<&StatFullLenArgs> for StatFullLenConfig {
    fn from(args: &StatFullLenArgs) -> Self {
        Self {
            reference: args.reference.clone().into(),
            paf: args.paf.clone().into(),
            thresholds: FilterThresholds {
                identity: args.identity,
                coverage: args.coverage,
            },
            fastq_mode: args.common.fastq_mode(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "map_paf2reads",
    version,
    about = "Choose appropriate reads for subsequent correction, trimmed to their aligned region",
    after_help = concat!(
        "Examples:\n",
        "    map_paf2reads -i input.paf -r reads.fastq -s identity_coverage.tsv >out_reads.fa\n",
        "    minimap2 --secondary=no -c -x map-ont genome.fa reads.fastq \\\n",
        "        | map_paf2reads -r reads.fastq -s identity_coverage.tsv >out_reads.fa",
    )
)]
pub struct MapPaf2ReadsArgs {
    /// Alignments in paf format, read from standard input when omitted
    #[arg(short, long, default_value = "")]
    pub input: String,

    /// Reads in fastq or fasta format
    #[arg(short, long)]
    pub read: String,

    /// Minimum similarity of matched bases to block length, in percent
    #[arg(long = "identity", visible_alias = "id", default_value_t = 75.0)]
    pub identity: f64,

    /// Minimum target coverage, in percent
    #[arg(short, long, default_value_t = 80.0)]
    pub coverage: f64,

    /// Output table of label, identity and coverage per kept alignment
    #[arg(short, long, default_value = "out.stv")]
    pub stat: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl From<&MapPaf2ReadsArgs> for MapPaf2ReadsConfig {
    fn from(args: &MapPaf2ReadsArgs) -> Self {
        Self {
            input_paf: args.input.clone(),
            reads: args.read.clone().into(),
            stat: args.stat.clone().into(),
            thresholds: FilterThresholds {
                identity: args.identity,
                coverage: args.coverage,
            },
            fastq_mode: args.common.fastq_mode(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "paf2reads",
    version,
    about = "Choose the reads that appear in an alignment file",
    after_help = concat!(
        "Examples:\n",
        "    paf2reads -i input.paf -r reads.fastq >out_reads.fa\n",
        "    minimap2 --secondary=no -c -x map-ont genome.fa reads.fastq \\\n",
        "        | paf2reads -r reads.fastq >out_reads.fa",
    )
)]
pub struct Paf2ReadsArgs {
    /// Alignments in paf format, read from standard input when omitted
    #[arg(short, long, default_value = "")]
    pub input: String,

    /// Reads in fastq or fasta format
    #[arg(short, long)]
    pub read: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl From<&Paf2ReadsArgs> for Paf2ReadsConfig {
    fn from(args: &Paf2ReadsArgs) -> Self {
        Self {
            input_paf: args.input.clone(),
            reads: args.read.clone().into(),
            fastq_mode: args.common.fastq_mode(),
        }
    }
}
