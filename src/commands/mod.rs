//! CLI command handlers for shipr.
//!
//! # Commands
//!
//! - [`ship`] - The default command: validate, commit, push, open or update a PR
//! - [`config`] - Display, set, and reset configuration

mod config;
mod ship;

pub use config::{config_display_command, config_reset_command, config_set_command, ConfigScope};
pub use ship::ship_command;

use crate::error::Result;
use crate::git::GitCli;
use std::env;
use std::path::{Path, PathBuf};

/// Directory a command runs against: `-C <path>` or the current directory.
pub(crate) fn working_dir(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(env::current_dir()?),
    }
}

/// Name keying the per-project config, when inside a repository.
pub(crate) fn current_project_name(path: Option<&Path>) -> Option<String> {
    let dir = working_dir(path).ok()?;
    GitCli::discover(&dir).ok()?.repo_name()
}
