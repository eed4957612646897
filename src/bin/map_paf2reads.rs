//! Choose reads for subsequent correction, trimmed to their aligned region.

use std::io::{self, BufWriter};

use anyhow::Context;
use clap::Parser;

use pafreads::cli::{self, MapPaf2ReadsArgs};
use pafreads::configs::MapPaf2ReadsConfig;
use pafreads::map_paf2reads;

fn main() {
    let args = MapPaf2ReadsArgs::parse();
    cli::init_logging(args.common.verbose);

    let config = MapPaf2ReadsConfig::from(&args);
    let mut out = BufWriter::new(io::stdout().lock());

    let result = map_paf2reads::run(&config, &mut out)
        .with_context(|| format!("extracting aligned reads from {}", config.reads.display()));

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
