//! Ship command handler.
//!
//! The default command: turn local edits into a pushed branch and a pull request.

use std::path::Path;

use tracing::debug;

use crate::config::get_effective_config;
use crate::error::Result;
use crate::flow::ExecutionFlags;
use crate::gh::GhCli;
use crate::git::GitCli;
use crate::intent::validate;
use crate::output::{print_outcome, TerminalReporter};
use crate::reporter::{FlowReporter, NoopReporter};
use crate::Runner;

use super::working_dir;

/// Run one ship invocation.
///
/// The description is checked before the repository or config is touched,
/// so a grammar failure has no side effects at all.
///
/// # Arguments
///
/// * `description` - Change description (positional or `--message`)
/// * `flags` - Flags from the command line, before config defaults
/// * `repo` - `-C` path, if given
/// * `json` - Print the outcome as JSON instead of the human summary
/// * `verbose` - Also print every controller step
pub fn ship_command(
    description: Option<&str>,
    flags: ExecutionFlags,
    repo: Option<&Path>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let description = description.unwrap_or_default();
    validate(description.trim(), flags.force)?;

    let dir = working_dir(repo)?;
    let git = GitCli::discover(&dir)?;
    let host = GhCli::new(git.root());

    let config = get_effective_config(git.repo_name().as_deref())?;
    let flags = config.apply_to(flags);
    debug!(?config, ?flags, root = %git.root().display(), "starting run");

    let terminal = TerminalReporter::new().with_verbose(verbose);
    let reporter: &dyn FlowReporter = if json { &NoopReporter } else { &terminal };

    let outcome = Runner::new(&git, &host)
        .with_reporter(reporter)
        .run(description, &flags)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}
