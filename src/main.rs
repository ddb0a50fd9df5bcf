// benchdigest CLI - turns compressed benchmark logs into the per-workload report
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use benchdigest::{init_logging_with_level, Loader, LoaderConfig, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_FILE};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Aggregate bzip2 benchmark logs into a per-workload JSON report",
    long_about = None,
    after_help = "LAYOUT:
  <INPUT_DIR>/<day>/**/<file>.bz2    every file below a day directory belongs to that day
  <INPUT_DIR>/<day>                  a file directly in the input directory is its own day

EXAMPLES:
  # Read ./data and write ./data.js
  benchdigest

  # Same, parsing files in parallel
  benchdigest --parallel"
)]
struct Cli {
    /// Enable verbose logging (DEBUG level)
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Parse log files in parallel
    #[arg(long)]
    parallel: bool,

    /// Directory of day subdirectories holding .bz2 logs
    #[arg(default_value = DEFAULT_INPUT_DIR)]
    input_dir: PathBuf,

    /// Report destination
    #[arg(default_value = DEFAULT_OUTPUT_FILE)]
    output_file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging_with_level(cli.verbose, cli.quiet);

    let config = LoaderConfig::builder()
        .input_dir(cli.input_dir)
        .output_file(cli.output_file)
        .parallel(cli.parallel)
        .build()
        .context("Invalid loader configuration")?;

    Loader::new(config).run()?;
    Ok(())
}
