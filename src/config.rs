use crate::error::{Result, ShiprError};
use crate::flow::ExecutionFlags;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The base config directory name under ~/.config/
const CONFIG_DIR_NAME: &str = "shipr";

/// Both global and per-project files use this name.
const CONFIG_FILENAME: &str = "config.toml";

/// Keys accepted by `shipr config set`.
pub const VALID_KEYS: [&str; 3] = ["draft", "sync", "base"];

// ============================================================================
// Configuration
// ============================================================================

/// Defaults applied to every run unless a CLI flag says otherwise.
///
/// ```toml
/// draft = false
/// sync = false
/// base = "develop"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Open new pull requests as drafts
    #[serde(default)]
    pub draft: bool,

    /// Rebase onto the base branch before pushing updates
    #[serde(default)]
    pub sync: bool,

    /// Target branch used instead of the repository default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

impl Config {
    /// Merge config defaults under the CLI flags. Flags always win: `--base`
    /// replaces `base`, `--draft` and `--sync` can only switch a default on.
    pub fn apply_to(&self, flags: ExecutionFlags) -> ExecutionFlags {
        ExecutionFlags {
            sync: flags.sync || self.sync,
            draft: flags.draft || self.draft,
            base_override: flags.base_override.or_else(|| self.base.clone()),
            ..flags
        }
    }

    /// Set one key from its string form, as typed on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "draft" => self.draft = parse_bool(key, value)?,
            "sync" => self.sync = parse_bool(key, value)?,
            "base" => {
                let value = value.trim();
                self.base = if value.is_empty() || value == "none" {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            _ => {
                return Err(ShiprError::Config(format!(
                    "Unknown config key '{}'. Valid keys: {}",
                    key,
                    VALID_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(ShiprError::Config(format!(
            "Invalid value '{}' for '{}': expected true or false",
            other, key
        ))),
    }
}

// ============================================================================
// Config File Management
// ============================================================================

/// Written the first time the global config is loaded.
const DEFAULT_CONFIG_WITH_COMMENTS: &str = r#"# shipr configuration
# Command-line flags always take precedence over these values.

# Open new pull requests as drafts (same as passing --draft)
draft = false

# Rebase onto the base branch before pushing updates (same as passing --sync)
# Requires a clean working tree.
sync = false

# Target branch for pull requests (same as passing --base)
# Leave unset to use the repository's default branch.
# base = "develop"
"#;

/// Generate config file content with explanatory comments.
fn generate_config_with_comments(config: &Config) -> String {
    let base = match &config.base {
        Some(base) => format!("base = {:?}", base),
        None => "# base = \"develop\"".to_string(),
    };

    format!(
        r#"# shipr configuration
# Command-line flags always take precedence over these values.

# Open new pull requests as drafts (same as passing --draft)
draft = {}

# Rebase onto the base branch before pushing updates (same as passing --sync)
# Requires a clean working tree.
sync = {}

# Target branch for pull requests (same as passing --base)
# Leave unset to use the repository's default branch.
{}
"#,
        config.draft, config.sync, base
    )
}

/// Get the shipr config directory path (~/.config/shipr/).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ShiprError::Config("Could not determine home directory".to_string()))?;
    Ok(home.join(".config").join(CONFIG_DIR_NAME))
}

pub fn global_config_path() -> Result<PathBuf> {
    Ok(global_config_path_at(&config_dir()?))
}

/// `~/.config/shipr/<project>/config.toml`
pub fn project_config_path(project: &str) -> Result<PathBuf> {
    Ok(project_config_path_at(&config_dir()?, project))
}

fn global_config_path_at(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILENAME)
}

fn project_config_path_at(dir: &Path, project: &str) -> PathBuf {
    dir.join(project).join(CONFIG_FILENAME)
}

/// Load a config from a specific path without any fallback logic.
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        ShiprError::Config(format!(
            "Failed to parse config file at {}: {}",
            path.display(),
            e
        ))
    })
}

/// Write `config` (with comments) to `path`, creating parent directories.
pub fn save_config_to_path(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, generate_config_with_comments(config))?;
    Ok(())
}

/// Load `~/.config/shipr/config.toml`, creating it with defaults if missing.
pub fn load_global_config() -> Result<Config> {
    load_global_config_at(&config_dir()?)
}

fn load_global_config_at(dir: &Path) -> Result<Config> {
    let path = global_config_path_at(dir);

    if !path.exists() {
        fs::create_dir_all(dir)?;
        fs::write(&path, DEFAULT_CONFIG_WITH_COMMENTS)?;
        return Ok(Config::default());
    }

    load_config_from_path(&path)
}

/// The config that applies to a run: the project file when it exists,
/// otherwise the global one. Never creates a project file.
pub fn get_effective_config(project: Option<&str>) -> Result<Config> {
    effective_config_at(&config_dir()?, project)
}

fn effective_config_at(dir: &Path, project: Option<&str>) -> Result<Config> {
    if let Some(project) = project {
        let path = project_config_path_at(dir, project);
        if path.exists() {
            return load_config_from_path(&path);
        }
    }
    load_global_config_at(dir)
}
