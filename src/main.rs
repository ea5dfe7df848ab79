use anyhow::Result;
use botblocks_core::cli::Args;
use clap::Parser;

fn main() -> Result<()> {
    let args = Args::parse();
    botblocks_core::init_tracing(args.verbose)?;
    botblocks_core::run_cli(&args)
}
