//! PR creation and the `gh`-backed [`ReviewHost`].

use std::path::PathBuf;
use std::process::{Command, Output};

use tracing::debug;

use crate::error::{Prerequisite, Result, ShiprError};

use super::detection::{most_relevant_request, parse_pr_list};
use super::types::{PullRequestDraft, PullRequestInfo};
use super::ReviewHost;

fn spawn_error(e: std::io::Error) -> ShiprError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ShiprError::MissingPrerequisite(Prerequisite::HostCli)
    } else {
        ShiprError::Io(e)
    }
}

/// [`ReviewHost`] backed by the GitHub CLI, run inside the repository root.
#[derive(Debug, Clone)]
pub struct GhCli {
    root: PathBuf,
}

impl GhCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(cwd = %self.root.display(), ?args, "gh");
        let output = Command::new("gh")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(spawn_error)?;
        Ok(output)
    }

    fn run_checked(&self, args: &[&str], what: &str) -> Result<String> {
        let output = self.run(args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ShiprError::GhError(format!(
                "Failed to {}: {}",
                what,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl ReviewHost for GhCli {
    fn is_authenticated(&self) -> Result<bool> {
        Ok(self.run(&["auth", "status"])?.status.success())
    }

    fn find_request(&self, branch: &str) -> Result<Option<PullRequestInfo>> {
        let stdout = self.run_checked(
            &[
                "pr",
                "list",
                "--head",
                branch,
                "--state",
                "all",
                "--json",
                "number,title,headRefName,url,state",
            ],
            "look up pull requests",
        )?;

        let prs = parse_pr_list(&stdout)?
            .into_iter()
            .filter(|pr| pr.head_ref_name == branch)
            .collect();
        Ok(most_relevant_request(prs))
    }

    fn create_request(&self, draft: &PullRequestDraft) -> Result<String> {
        let mut args = vec![
            "pr",
            "create",
            "--title",
            draft.title.as_str(),
            "--body",
            draft.body.as_str(),
            "--base",
            draft.base.as_str(),
            "--head",
            draft.head.as_str(),
        ];
        if draft.draft {
            args.push("--draft");
        }

        let stdout = self.run_checked(&args, "create PR")?;
        extract_pr_url(&stdout).ok_or_else(|| {
            ShiprError::GhError("PR created but no URL was returned".to_string())
        })
    }
}

/// `gh pr create` prints progress lines before the URL; take the last URL.
fn extract_pr_url(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with("https://") || line.starts_with("http://"))
        .map(|line| line.to_string())
}
