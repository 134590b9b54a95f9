//! Stepladder CLI - schema version ledger and migration runner

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::common::ExitCode;
use commands::{init, plan, rollback, status, upgrade, validate};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        Commands::Init(args) => init::execute(args),
        Commands::Status(args) => status::execute(args, &cli.global),
        Commands::Plan(args) => plan::execute(args, &cli.global),
        Commands::Upgrade(args) => upgrade::execute(args, &cli.global),
        Commands::Rollback(args) => rollback::execute(args, &cli.global),
        Commands::Log(args) => commands::log::execute(args, &cli.global),
        Commands::Validate => validate::execute(&cli.global),
    };

    if let Err(err) = result {
        if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
            std::process::exit(*code);
        }
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` selects debug and the default is warn.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
