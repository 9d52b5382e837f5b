//! shipr CLI entry point.
//!
//! Parses command-line arguments and dispatches to the appropriate command handler.

use clap::Parser;
use shipr::cli::{Cli, Commands, ConfigSubcommand};
use shipr::commands::{
    config_display_command, config_reset_command, config_set_command, ship_command, ConfigScope,
};
use shipr::completion::{print_completion_script, ShellType};
use shipr::output::print_shipr_error;
use tracing_subscriber::EnvFilter;

/// Log filter read from the environment, e.g. `SHIPR_LOG=shipr=trace`.
const LOG_ENV: &str = "SHIPR_LOG";

fn init_logging(verbose: bool) {
    let default = if verbose { "shipr=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // Ignore the error: a subscriber may already be set when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let repo = cli.ship.repo.as_deref();

    let result = match &cli.command {
        Some(Commands::Config {
            global,
            project,
            subcommand,
        }) => match subcommand {
            None => {
                let scope = match (global, project) {
                    (true, false) => ConfigScope::Global,
                    (false, true) => ConfigScope::Project,
                    _ => ConfigScope::Both,
                };
                config_display_command(scope, repo)
            }
            Some(ConfigSubcommand::Set { global, key, value }) => {
                config_set_command(key, value, *global, repo)
            }
            Some(ConfigSubcommand::Reset { global }) => config_reset_command(*global, repo),
        },

        Some(Commands::Completions { shell }) => {
            ShellType::from_name(shell).map(print_completion_script)
        }

        None => {
            let description = cli.description.as_deref().or(cli.ship.message.as_deref());
            ship_command(
                description,
                cli.ship.flags(),
                repo,
                cli.ship.json,
                cli.verbose,
            )
        }
    };

    if let Err(e) = result {
        print_shipr_error(&e);
        std::process::exit(1);
    }
}
