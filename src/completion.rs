//! Shell completion scripts for bash, zsh, and fish.
//!
//! Backs the hidden `shipr completions <shell>` command:
//!
//! ```ignore
//! eval "$(shipr completions bash)"
//! shipr completions zsh > ~/.zfunc/_shipr
//! shipr completions fish > ~/.config/fish/completions/shipr.fish
//! ```

use crate::cli::Cli;
use crate::error::{Result, ShiprError};
use clap::CommandFactory;
use clap_complete::{generate, Shell};

pub const SUPPORTED_SHELLS: [&str; 3] = ["bash", "zsh", "fish"];

/// Supported shell types for completion scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
}

impl ShellType {
    /// Parse a shell name or a path to a shell binary (`/bin/zsh`).
    pub fn from_name(shell: &str) -> Result<Self> {
        let name = std::path::Path::new(shell)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(shell);

        match name {
            "bash" => Ok(ShellType::Bash),
            "zsh" => Ok(ShellType::Zsh),
            "fish" => Ok(ShellType::Fish),
            _ => Err(ShiprError::Config(format!(
                "Unsupported shell: '{}'. Supported shells are: {}.",
                name,
                SUPPORTED_SHELLS.join(", ")
            ))),
        }
    }

    /// Convert to the `clap_complete::Shell` type.
    pub fn to_clap_shell(self) -> Shell {
        match self {
            ShellType::Bash => Shell::Bash,
            ShellType::Zsh => Shell::Zsh,
            ShellType::Fish => Shell::Fish,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShellType::Bash => "bash",
            ShellType::Zsh => "zsh",
            ShellType::Fish => "fish",
        }
    }
}

impl std::fmt::Display for ShellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Generate the completion script for `shell` from the real CLI definition.
pub fn generate_completion_script(shell: ShellType) -> String {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    generate(shell.to_clap_shell(), &mut cmd, "shipr", &mut buf);
    String::from_utf8(buf).unwrap_or_default()
}

pub fn print_completion_script(shell: ShellType) {
    print!("{}", generate_completion_script(shell));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_accepts_names_and_paths() {
        assert_eq!(ShellType::from_name("bash").unwrap(), ShellType::Bash);
        assert_eq!(ShellType::from_name("/bin/zsh").unwrap(), ShellType::Zsh);
        assert_eq!(
            ShellType::from_name("/usr/local/bin/fish").unwrap(),
            ShellType::Fish
        );
    }

    #[test]
    fn test_from_name_unsupported_lists_supported() {
        let err = ShellType::from_name("powershell").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("powershell"));
        assert!(msg.contains("bash, zsh, fish"));
    }

    #[test]
    fn test_generate_completion_script_bash() {
        let script = generate_completion_script(ShellType::Bash);
        assert!(script.contains("shipr"));
        assert!(script.contains("--sync"));
        assert!(script.contains("--draft"));
    }

    #[test]
    fn test_generate_completion_script_zsh_and_fish() {
        assert!(generate_completion_script(ShellType::Zsh).contains("#compdef shipr"));
        assert!(generate_completion_script(ShellType::Fish).contains("complete -c shipr"));
    }

    #[test]
    fn test_shell_type_display() {
        assert_eq!(ShellType::Bash.to_string(), "bash");
        assert_eq!(ShellType::Zsh.to_string(), "zsh");
        assert_eq!(ShellType::Fish.to_string(), "fish");
    }
}
