//! Command-line definition.

use crate::flow::ExecutionFlags;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shipr")]
#[command(
    version,
    about = "Turn local edits into a pushed branch and a pull request, safely",
    after_help = "EXAMPLES:
    # On the default branch with local edits: new branch, commit, push, PR
    shipr \"feat: add widget\"

    # On a feature branch: commit and push more work to its PR
    shipr \"fix(parser): handle empty input\"

    # Rebase onto the base branch first (force-with-lease push)
    shipr --sync \"chore: refresh lockfile\"

    # Start a new PR from a feature branch, as a draft, against develop
    shipr --new --draft --base develop \"refactor: split module\""
)]
pub struct Cli {
    /// Change description in conventional commit form, e.g. "feat: add widget"
    #[arg(value_name = "DESCRIPTION", conflicts_with = "message")]
    pub description: Option<String>,

    #[command(flatten)]
    pub ship: ShipArgs,

    /// Print debug logs (same as SHIPR_LOG=shipr=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ShipArgs {
    /// Change description (alternative to the positional argument)
    #[arg(short, long, value_name = "TEXT")]
    pub message: Option<String>,

    /// Rebase onto the base branch before pushing; requires a clean tree
    #[arg(short, long)]
    pub sync: bool,

    /// Open a new pull request even when not on the default branch
    #[arg(short, long)]
    pub new: bool,

    /// Use this branch name instead of generating one
    #[arg(short, long, value_name = "NAME")]
    pub branch: Option<String>,

    /// Accept a description that is not a conventional commit message
    #[arg(short, long)]
    pub force: bool,

    /// Open the pull request as a draft
    #[arg(short, long)]
    pub draft: bool,

    /// Target branch for the pull request (defaults to the repository default)
    #[arg(long, value_name = "BRANCH")]
    pub base: Option<String>,

    /// Print the run outcome as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Run as if started in PATH
    #[arg(short = 'C', value_name = "PATH")]
    pub repo: Option<PathBuf>,
}

impl ShipArgs {
    pub fn flags(&self) -> ExecutionFlags {
        ExecutionFlags {
            sync: self.sync,
            new: self.new,
            explicit_branch: self.branch.clone(),
            force: self.force,
            draft: self.draft,
            base_override: self.base.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// View, modify, or reset configuration values
    #[command(after_help = "EXAMPLES:
    shipr config                        # Show global and project config
    shipr config --global               # Show only global config
    shipr config set draft true         # Set a value in project config
    shipr config set -g base develop    # Set a value in global config
    shipr config reset                  # Reset project config to defaults

CONFIG FILES:
    Global:  ~/.config/shipr/config.toml
    Project: ~/.config/shipr/<repo>/config.toml

    The project config takes precedence over global config when it exists.

VALID KEYS:
    draft  - Open new pull requests as drafts (true/false)
    sync   - Rebase before pushing updates (true/false)
    base   - Default target branch (name, or \"none\" to unset)")]
    Config {
        /// Show only the global configuration
        #[arg(short, long, conflicts_with = "project")]
        global: bool,

        /// Show only the project configuration
        #[arg(short, long, conflicts_with = "global")]
        project: bool,

        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },

    /// Output shell completion script to stdout (hidden utility command)
    #[command(hide = true)]
    Completions {
        /// Shell type to generate completions for (bash, zsh, or fish)
        shell: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Set a configuration value
    Set {
        /// Write to the global config instead of the project config
        #[arg(short, long)]
        global: bool,

        /// Key to set (draft, sync, base)
        key: String,

        /// New value
        value: String,
    },

    /// Reset configuration to default values
    Reset {
        /// Reset the global config instead of the project config
        #[arg(short, long)]
        global: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_description_with_flags() {
        let cli = Cli::try_parse_from(["shipr", "-s", "-d", "--base", "develop", "feat: x"]).unwrap();
        assert_eq!(cli.description.as_deref(), Some("feat: x"));
        let flags = cli.ship.flags();
        assert!(flags.sync);
        assert!(flags.draft);
        assert!(!flags.new);
        assert_eq!(flags.base_override.as_deref(), Some("develop"));
    }

    #[test]
    fn test_message_flag_and_branch() {
        let cli = Cli::try_parse_from(["shipr", "-n", "-b", "topic", "-m", "fix: y"]).unwrap();
        assert_eq!(cli.description, None);
        assert_eq!(cli.ship.message.as_deref(), Some("fix: y"));
        let flags = cli.ship.flags();
        assert!(flags.new);
        assert_eq!(flags.explicit_branch.as_deref(), Some("topic"));
    }

    #[test]
    fn test_positional_and_message_conflict() {
        assert!(Cli::try_parse_from(["shipr", "-m", "fix: a", "fix: b"]).is_err());
    }

    #[test]
    fn test_repo_path_and_json() {
        let cli = Cli::try_parse_from(["shipr", "-C", "/tmp/repo", "--json", "feat: z"]).unwrap();
        assert_eq!(cli.ship.repo, Some(PathBuf::from("/tmp/repo")));
        assert!(cli.ship.json);
    }

    #[test]
    fn test_config_set_subcommand() {
        let cli = Cli::try_parse_from(["shipr", "config", "set", "-g", "draft", "true"]).unwrap();
        match cli.command {
            Some(Commands::Config {
                subcommand: Some(ConfigSubcommand::Set { global, key, value }),
                ..
            }) => {
                assert!(global);
                assert_eq!(key, "draft");
                assert_eq!(value, "true");
            }
            other => panic!("Expected config set, got {:?}", other),
        }
    }

    #[test]
    fn test_config_reset_subcommand() {
        let cli = Cli::try_parse_from(["shipr", "config", "reset"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                subcommand: Some(ConfigSubcommand::Reset { global: false }),
                ..
            })
        ));
    }

    #[test]
    fn test_config_scope_flags_conflict() {
        assert!(Cli::try_parse_from(["shipr", "config", "--global", "--project"]).is_err());
    }

    #[test]
    fn test_completions_hidden_subcommand() {
        let cli = Cli::try_parse_from(["shipr", "completions", "zsh"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Completions { ref shell }) if shell == "zsh"));
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["shipr", "config", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
