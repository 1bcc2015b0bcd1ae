//! cdnsync CLI - Command-line utility for importing npm releases into a CDN
//! library catalog.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    logging::init(cli.verbose, cli.quiet);
    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match &cli.command {
        cli::Commands::Check(args) => commands::check::execute(args, &*formatter),
        cli::Commands::Contains(args) => commands::contains::execute(args, &*formatter),
        cli::Commands::Import(args) => commands::import::execute(args, &*formatter),
        cli::Commands::Update(args) => {
            commands::update::execute(args, &*formatter, cli.quiet || cli.json)
        }
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    }
}
