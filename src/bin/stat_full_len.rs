//! Count the number of full-length reads per reference sequence.

use std::io::{self, BufWriter};

use anyhow::Context;
use clap::Parser;

use pafreads::cli::{self, StatFullLenArgs};
use pafreads::configs::StatFullLenConfig;
use pafreads::stat_full_len;

fn main() {
    let args = StatFullLenArgs::parse();
    cli::init_logging(args.common.verbose);

    let config = StatFullLenConfig::from(&args);
    let mut out = BufWriter::new(io::stdout().lock());

    let result = stat_full_len::run(&config, &mut out).with_context(|| {
        format!(
            "counting full-length reads of {} in {}",
            config.reference.display(),
            config.paf.display()
        )
    });

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
