//! Choose the reads that appear in an alignment file.

use std::io::{self, BufWriter};

use anyhow::Context;
use clap::Parser;

use pafreads::cli::{self, Paf2ReadsArgs};
use pafreads::configs::Paf2ReadsConfig;
use pafreads::paf2reads;

fn main() {
    let args = Paf2ReadsArgs::parse();
    cli::init_logging(args.common.verbose);

    let config = Paf2ReadsConfig::from(&args);
    let mut out = BufWriter::new(io::stdout().lock());

    let result = paf2reads::run(&config, &mut out)
        .with_context(|| format!("extracting reads from {}", config.reads.display()));

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
