//! Git operations.
//!
//! [`GitBackend`] is the narrow interface the flow controller consumes;
//! [`GitCli`] implements it by running the `git` binary inside an explicit
//! repository root.

use crate::error::{Result, ShiprError};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// The single remote this tool works against.
pub const ORIGIN: &str = "origin";

/// Remote-tracking ref for a branch on origin, e.g. `origin/main`.
pub fn remote_ref(branch: &str) -> String {
    format!("{}/{}", ORIGIN, branch)
}

/// One line of `git log`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    pub short_hash: String,
    pub subject: String,
}

/// An interrupted multi-step git operation that blocks new work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InProgressOperation {
    Rebase,
    Merge,
    CherryPick,
}

impl InProgressOperation {
    pub fn remediation(&self) -> &'static str {
        match self {
            InProgressOperation::Rebase => {
                "Finish it with `git rebase --continue` or cancel it with `git rebase --abort`."
            }
            InProgressOperation::Merge => {
                "Finish it with `git commit` or cancel it with `git merge --abort`."
            }
            InProgressOperation::CherryPick => {
                "Finish it with `git cherry-pick --continue` or cancel it with `git cherry-pick --abort`."
            }
        }
    }
}

impl fmt::Display for InProgressOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InProgressOperation::Rebase => write!(f, "rebase"),
            InProgressOperation::Merge => write!(f, "merge"),
            InProgressOperation::CherryPick => write!(f, "cherry-pick"),
        }
    }
}

/// How a branch is pushed to origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PushMode {
    /// `git push --set-upstream origin <branch>`
    Tracking,
    /// `git push --force-with-lease --set-upstream origin <branch>`
    ForceWithLease,
}

impl fmt::Display for PushMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushMode::Tracking => write!(f, "push"),
            PushMode::ForceWithLease => write!(f, "force-with-lease push"),
        }
    }
}

/// Version-control operations consumed by the flow controller.
///
/// Revisions are passed as anything `git rev-parse` understands (`HEAD`,
/// `origin/main`, a branch name). Counts are `from..to` set differences.
pub trait GitBackend {
    /// Current branch name, or `None` when HEAD is detached
    fn current_branch(&self) -> Result<Option<String>>;

    /// The default branch advertised by origin's symbolic HEAD
    fn default_branch(&self) -> Result<String>;

    fn has_origin(&self) -> Result<bool>;

    fn operation_in_progress(&self) -> Result<Option<InProgressOperation>>;

    /// True when there are no staged, unstaged or untracked changes
    fn is_clean(&self) -> Result<bool>;

    fn head_commit(&self) -> Result<String>;

    /// Fetch one branch from origin, updating `origin/<branch>`
    fn fetch(&self, branch: &str) -> Result<()>;

    fn remote_branch_exists(&self, branch: &str) -> Result<bool>;

    fn local_branch_exists(&self, branch: &str) -> Result<bool>;

    fn count_commits(&self, from: &str, to: &str) -> Result<u32>;

    fn list_commits(&self, from: &str, to: &str) -> Result<Vec<CommitInfo>>;

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool>;

    fn is_valid_branch_name(&self, name: &str) -> Result<bool>;

    /// Create a branch at HEAD and switch to it
    fn create_branch(&self, name: &str) -> Result<()>;

    fn checkout(&self, branch: &str) -> Result<()>;

    fn delete_branch(&self, branch: &str) -> Result<()>;

    /// Move the current branch to `rev`, keeping the changes staged
    fn reset_soft(&self, rev: &str) -> Result<()>;

    fn merge_ff_only(&self, rev: &str) -> Result<()>;

    fn stage_all(&self) -> Result<()>;

    fn has_staged_changes(&self) -> Result<bool>;

    fn commit(&self, message: &str) -> Result<()>;

    fn rebase(&self, onto: &str) -> Result<()>;

    fn push(&self, branch: &str, mode: PushMode) -> Result<()>;
}

/// [`GitBackend`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// Use `root` as the working tree without checking it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Locate the working tree containing `path`.
    pub fn discover(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(path)
            .output()?;

        if !output.status.success() {
            return Err(ShiprError::GitError(format!(
                "'{}' is not inside a git repository: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Basename of the working tree, used to key per-project config.
    pub fn repo_name(&self) -> Option<String> {
        self.root
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(cwd = %self.root.display(), ?args, "git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()?;
        Ok(output)
    }

    /// Run git and return trimmed stdout, or a `GitError` carrying stderr.
    fn run_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(ShiprError::GitError(format!(
                "`git {}` failed: {}",
                args.join(" "),
                detail
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run a git predicate: exit 0 is true, exit 1 is false, anything else is an error.
    fn run_predicate(&self, args: &[&str]) -> Result<bool> {
        let output = self.run(args)?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(ShiprError::GitError(format!(
                "`git {}` failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }

    fn git_path_exists(&self, name: &str) -> Result<bool> {
        let path = self.run_checked(&["rev-parse", "--git-path", name])?;
        let path = PathBuf::from(path);
        let path = if path.is_absolute() {
            path
        } else {
            self.root.join(path)
        };
        Ok(path.exists())
    }
}

impl GitBackend for GitCli {
    fn current_branch(&self) -> Result<Option<String>> {
        let output = self.run(&["symbolic-ref", "--quiet", "--short", "HEAD"])?;

        if !output.status.success() {
            return Ok(None);
        }

        let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(if branch.is_empty() { None } else { Some(branch) })
    }

    fn default_branch(&self) -> Result<String> {
        let local_head = format!("refs/remotes/{}/HEAD", ORIGIN);
        let output = self.run(&["symbolic-ref", "--quiet", "--short", &local_head])?;

        if output.status.success() {
            let symbolic = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let prefix = format!("{}/", ORIGIN);
            if let Some(branch) = symbolic.strip_prefix(&prefix) {
                return Ok(branch.to_string());
            }
        }

        // origin/HEAD is not set locally; ask the remote
        let listing = self.run_checked(&["ls-remote", "--symref", ORIGIN, "HEAD"])?;
        parse_symref_head(&listing).ok_or_else(|| {
            ShiprError::GitError("Could not determine the default branch of origin".to_string())
        })
    }

    fn has_origin(&self) -> Result<bool> {
        let remotes = self.run_checked(&["remote"])?;
        Ok(remotes.lines().any(|r| r.trim() == ORIGIN))
    }

    fn operation_in_progress(&self) -> Result<Option<InProgressOperation>> {
        if self.git_path_exists("rebase-merge")? || self.git_path_exists("rebase-apply")? {
            return Ok(Some(InProgressOperation::Rebase));
        }
        if self.git_path_exists("MERGE_HEAD")? {
            return Ok(Some(InProgressOperation::Merge));
        }
        if self.git_path_exists("CHERRY_PICK_HEAD")? {
            return Ok(Some(InProgressOperation::CherryPick));
        }
        Ok(None)
    }

    fn is_clean(&self) -> Result<bool> {
        let status = self.run_checked(&["status", "--porcelain"])?;
        Ok(status.is_empty())
    }

    fn head_commit(&self) -> Result<String> {
        self.run_checked(&["rev-parse", "HEAD"])
    }

    fn fetch(&self, branch: &str) -> Result<()> {
        let refspec = format!("+refs/heads/{0}:refs/remotes/{1}/{0}", branch, ORIGIN);
        self.run_checked(&["fetch", ORIGIN, &refspec])?;
        Ok(())
    }

    fn remote_branch_exists(&self, branch: &str) -> Result<bool> {
        let head = format!("refs/heads/{}", branch);
        let output = self.run(&["ls-remote", "--exit-code", "--heads", ORIGIN, &head])?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(2) => Ok(false),
            _ => Err(ShiprError::GitError(format!(
                "Failed to query origin for '{}': {}",
                branch,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }

    fn local_branch_exists(&self, branch: &str) -> Result<bool> {
        let output = self.run(&[
            "show-ref",
            "--verify",
            "--quiet",
            &format!("refs/heads/{}", branch),
        ])?;
        Ok(output.status.success())
    }

    fn count_commits(&self, from: &str, to: &str) -> Result<u32> {
        let range = format!("{}..{}", from, to);
        let count = self.run_checked(&["rev-list", "--count", &range])?;
        count.parse::<u32>().map_err(|e| {
            ShiprError::GitError(format!("Unexpected rev-list output '{}': {}", count, e))
        })
    }

    fn list_commits(&self, from: &str, to: &str) -> Result<Vec<CommitInfo>> {
        let range = format!("{}..{}", from, to);
        let log = self.run_checked(&["log", "--format=%h%x09%s", &range])?;
        Ok(parse_commit_log(&log))
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        self.run_predicate(&["merge-base", "--is-ancestor", ancestor, descendant])
    }

    fn is_valid_branch_name(&self, name: &str) -> Result<bool> {
        let output = self.run(&["check-ref-format", "--branch", name])?;
        Ok(output.status.success())
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        self.run_checked(&["checkout", "-b", name])?;
        Ok(())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.run_checked(&["checkout", branch])?;
        Ok(())
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        self.run_checked(&["branch", "-D", branch])?;
        Ok(())
    }

    fn reset_soft(&self, rev: &str) -> Result<()> {
        self.run_checked(&["reset", "--soft", rev])?;
        Ok(())
    }

    fn merge_ff_only(&self, rev: &str) -> Result<()> {
        self.run_checked(&["merge", "--ff-only", rev])?;
        Ok(())
    }

    fn stage_all(&self) -> Result<()> {
        self.run_checked(&["add", "--all"])?;
        Ok(())
    }

    fn has_staged_changes(&self) -> Result<bool> {
        // --quiet exits 1 when there are differences
        self.run_predicate(&["diff", "--cached", "--quiet"])
            .map(|no_diff| !no_diff)
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run_checked(&["commit", "--message", message])?;
        Ok(())
    }

    fn rebase(&self, onto: &str) -> Result<()> {
        self.run_checked(&["rebase", onto])?;
        Ok(())
    }

    fn push(&self, branch: &str, mode: PushMode) -> Result<()> {
        let mut args = vec!["push"];
        if mode == PushMode::ForceWithLease {
            args.push("--force-with-lease");
        }
        args.extend(["--set-upstream", ORIGIN, branch]);
        self.run_checked(&args)?;
        Ok(())
    }
}

/// Extract the branch from `git ls-remote --symref origin HEAD` output.
///
/// Expected first line: `ref: refs/heads/main\tHEAD`
fn parse_symref_head(listing: &str) -> Option<String> {
    listing.lines().find_map(|line| {
        let rest = line.strip_prefix("ref:")?.trim();
        let (target, name) = rest.split_once('\t')?;
        if name.trim() != "HEAD" {
            return None;
        }
        target
            .trim()
            .strip_prefix("refs/heads/")
            .map(|b| b.to_string())
    })
}

fn parse_commit_log(log: &str) -> Vec<CommitInfo> {
    log.lines()
        .filter_map(|line| {
            let (hash, subject) = line.split_once('\t')?;
            let hash = hash.trim();
            if hash.is_empty() {
                return None;
            }
            Some(CommitInfo {
                short_hash: hash.to_string(),
                subject: subject.trim().to_string(),
            })
        })
        .collect()
}
