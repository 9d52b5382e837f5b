//! Config command handler.
//!
//! Displays, modifies, and resets shipr configuration values.

use crate::config::{
    global_config_path, load_config_from_path, project_config_path, save_config_to_path, Config,
};
use crate::error::{Result, ShiprError};
use crate::output::{print_info, BOLD, CYAN, GRAY, RESET, YELLOW};
use std::path::Path;

use super::current_project_name;

/// Scope for config operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// Global configuration (~/.config/shipr/config.toml)
    Global,
    /// Repository configuration (~/.config/shipr/<repo>/config.toml)
    Project,
    /// Both global and project configurations
    Both,
}

/// Display configuration values.
///
/// When scope is `Both`, global config is shown first, then project config.
///
/// # Arguments
///
/// * `scope` - Which configuration(s) to display
/// * `repo` - `-C` path used to find the project, if given
pub fn config_display_command(scope: ConfigScope, repo: Option<&Path>) -> Result<()> {
    match scope {
        ConfigScope::Global => display_global_config(),
        ConfigScope::Project => display_project_config(&require_project(repo)?),
        ConfigScope::Both => {
            display_global_config()?;
            match current_project_name(repo) {
                Some(project) => {
                    println!();
                    display_project_config(&project)
                }
                None => Ok(()),
            }
        }
    }
}

/// Set one key, in the project config unless `global` is set.
///
/// A new project file starts from the global values, because the whole
/// project file replaces the global one once it exists.
pub fn config_set_command(key: &str, value: &str, global: bool, repo: Option<&Path>) -> Result<()> {
    let global_path = global_config_path()?;
    let path = if global {
        global_path.clone()
    } else {
        project_config_path(&require_project(repo)?)?
    };

    set_value_at(&path, &global_path, key, value)?;
    print_info(&format!("Set {} in {}", key, path.display()));
    Ok(())
}

/// Reset the project (or global) config to defaults.
pub fn config_reset_command(global: bool, repo: Option<&Path>) -> Result<()> {
    let path = if global {
        global_config_path()?
    } else {
        project_config_path(&require_project(repo)?)?
    };

    save_config_to_path(&path, &Config::default())?;
    print_info(&format!("Reset {} to defaults", path.display()));
    Ok(())
}

fn set_value_at(path: &Path, fallback: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = if path.exists() {
        load_config_from_path(path)?
    } else if fallback.exists() {
        load_config_from_path(fallback)?
    } else {
        Config::default()
    };

    config.set(key, value)?;
    save_config_to_path(path, &config)
}

fn require_project(repo: Option<&Path>) -> Result<String> {
    current_project_name(repo).ok_or_else(|| {
        ShiprError::Config(
            "Not in a git repository.\n\n\
            Project configuration is keyed by repository.\n\
            Run this command from within a repository, or use --global."
                .to_string(),
        )
    })
}

fn display_global_config() -> Result<()> {
    let path = global_config_path()?;
    println!("{BOLD}# Global config{RESET}");
    println!("{GRAY}# {}{RESET}", path.display());
    println!();

    if !path.exists() {
        println!("{YELLOW}# (file does not exist, using defaults){RESET}");
        println!();
        print_config_as_toml(&Config::default());
        return Ok(());
    }

    print_config_as_toml(&load_config_from_path(&path)?);
    Ok(())
}

fn display_project_config(project: &str) -> Result<()> {
    let path = project_config_path(project)?;
    println!("{BOLD}# Project config ({}){RESET}", project);
    println!("{GRAY}# {}{RESET}", path.display());
    println!();

    if !path.exists() {
        println!("{YELLOW}# (file does not exist, using global config or defaults){RESET}");
        println!();
        let global = global_config_path()?;
        let effective = if global.exists() {
            load_config_from_path(&global)?
        } else {
            Config::default()
        };
        print_config_as_toml(&effective);
        return Ok(());
    }

    print_config_as_toml(&load_config_from_path(&path)?);
    Ok(())
}

fn print_config_as_toml(config: &Config) {
    for line in config_to_toml_string(config).lines() {
        match line.split_once(" = ") {
            Some((key, value)) => println!("{CYAN}{}{RESET} = {}", key, value),
            None => println!("{}", line),
        }
    }
}

/// Render a config as plain TOML, one `key = value` per line.
pub fn config_to_toml_string(config: &Config) -> String {
    let mut out = format!("draft = {}\nsync = {}", config.draft, config.sync);
    if let Some(base) = &config.base {
        out.push_str(&format!("\nbase = {:?}", base));
    }
    out
}
