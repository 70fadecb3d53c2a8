mod args;
mod config;
mod output;
mod run;
mod util;

use args::Cli;
use config::RunConfig;
use run::run;
use util::{init_logging, set_threads};

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.common_args.verbose);
    set_threads(cli.common_args.num_threads)?;

    let config = RunConfig::try_from(&cli)?;
    log::debug!("{config:?}");

    run(&config)
}
