use anyhow::Result;
use clap::Parser;

use regionmap::cli::{Cli, Commands};
use regionmap::commands::{build_reference, qa, resolve};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    match &cli.command {
        Commands::Resolve(args) => resolve::run(args),
        Commands::BuildReference(args) => build_reference::run(args),
        Commands::Qa(args) => qa::run(args),
    }
}
