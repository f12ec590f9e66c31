//! chanflow CLI: run a stream session or the line-count pipeline.

use anyhow::Result;
use clap::Parser;
use chanflow::engine::arg_parser::Cli;
use chanflow::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
