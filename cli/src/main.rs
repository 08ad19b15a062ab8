mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::run;

pub fn main_inner() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    commands::init_logging(cli.verbose);
    match &cli.command {
        Commands::Run(args) => run::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { main_inner() }
