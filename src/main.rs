mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let args = Cli::parse();
    cli::logging::init(args.verbose, args.quiet);

    let config = args.config.as_deref();
    let result = match args.command {
        Commands::Sync(sync_args) => cli::commands::sync::execute(config, sync_args),
        Commands::Keys { action } => cli::commands::keys::execute(config, &action),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
