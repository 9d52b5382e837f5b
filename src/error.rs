use crate::git::{CommitInfo, InProgressOperation};
use std::fmt;
use thiserror::Error;

/// A precondition that must hold before any repository mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prerequisite {
    /// The `gh` executable could not be started
    HostCli,
    /// `gh auth status` failed
    HostAuthentication,
    /// No remote named `origin`
    OriginRemote,
    /// A rebase or merge is already underway
    NoOperationInProgress(InProgressOperation),
    /// HEAD does not point at a named branch
    NamedBranch,
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prerequisite::HostCli => write!(f, "GitHub CLI (gh) is not installed"),
            Prerequisite::HostAuthentication => write!(f, "not authenticated with GitHub CLI"),
            Prerequisite::OriginRemote => write!(f, "no remote named 'origin' is configured"),
            Prerequisite::NoOperationInProgress(op) => write!(f, "a {} is already in progress", op),
            Prerequisite::NamedBranch => write!(f, "HEAD is detached (not on a named branch)"),
        }
    }
}

/// Why an explicit branch name was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchNameProblem {
    /// Violates git ref-naming rules
    InvalidRefName,
    /// A local branch with this name exists
    ExistsLocally,
    /// A branch with this name exists on origin
    ExistsOnRemote,
}

impl fmt::Display for BranchNameProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchNameProblem::InvalidRefName => write!(f, "not a valid git branch name"),
            BranchNameProblem::ExistsLocally => write!(f, "a local branch with this name already exists"),
            BranchNameProblem::ExistsOnRemote => write!(f, "a branch with this name already exists on origin"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ShiprError {
    #[error("Invalid change description {0:?}: expected `type(scope)?!?: description` with type one of feat, fix, docs, chore, refactor, perf, test, ci, build")]
    InvalidIntentFormat(String),

    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(Prerequisite),

    #[error("Base branch '{0}' does not exist on origin")]
    UnknownBaseBranch(String),

    #[error("Local '{branch}' has {} unpushed commit(s) that would be carried into the new branch:\n{}", .commits.len(), format_commits(.commits))]
    UnpushedDefaultBranchCommits {
        branch: String,
        commits: Vec<CommitInfo>,
    },

    #[error("Local '{branch}' cannot be fast-forwarded to origin/{branch}: {detail}")]
    UnexpectedDivergence { branch: String, detail: String },

    #[error("Staging produced no changes to commit on '{branch}'")]
    EmptyCommit { branch: String },

    #[error("Branch name '{name}' rejected: {problem}")]
    InvalidOrCollidingBranchName {
        name: String,
        problem: BranchNameProblem,
    },

    #[error("The pull request for '{branch}' is already merged; further pushes will not reach the base branch{}", .url.as_deref().map(|u| format!(" ({})", u)).unwrap_or_default())]
    CannotUpdateMergedRequest { branch: String, url: Option<String> },

    #[error("Working tree has uncommitted changes; --sync requires a clean tree")]
    DirtyTreeDuringSync,

    #[error("origin/{branch} has commits that are not in your local history; a forced push would discard them")]
    RemoteHasUnseenCommits { branch: String },

    #[error("Rebase onto '{onto}' stopped with conflicts: {detail}")]
    RebaseConflict { onto: String, detail: String },

    #[error("Push of '{branch}' was rejected: {detail}")]
    PushRejected { branch: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Git error: {0}")]
    GitError(String),

    #[error("GitHub CLI error: {0}")]
    GhError(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn format_commits(commits: &[CommitInfo]) -> String {
    commits
        .iter()
        .map(|c| format!("  {} {}", c.short_hash, c.subject))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ShiprError {
    /// Stable name of the violated guard, printed in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ShiprError::InvalidIntentFormat(_) => "InvalidIntentFormat",
            ShiprError::MissingPrerequisite(_) => "MissingPrerequisite",
            ShiprError::UnknownBaseBranch(_) => "UnknownBaseBranch",
            ShiprError::UnpushedDefaultBranchCommits { .. } => "UnpushedDefaultBranchCommits",
            ShiprError::UnexpectedDivergence { .. } => "UnexpectedDivergence",
            ShiprError::EmptyCommit { .. } => "EmptyCommit",
            ShiprError::InvalidOrCollidingBranchName { .. } => "InvalidOrCollidingBranchName",
            ShiprError::CannotUpdateMergedRequest { .. } => "CannotUpdateMergedRequest",
            ShiprError::DirtyTreeDuringSync => "DirtyTreeDuringSync",
            ShiprError::RemoteHasUnseenCommits { .. } => "RemoteHasUnseenCommits",
            ShiprError::RebaseConflict { .. } => "RebaseConflict",
            ShiprError::PushRejected { .. } => "PushRejected",
            ShiprError::Io(_) => "Io",
            ShiprError::Json(_) => "Json",
            ShiprError::GitError(_) => "GitError",
            ShiprError::GhError(_) => "GhError",
            ShiprError::Config(_) => "Config",
        }
    }

    /// Concrete commands that get the user unstuck, if there are any.
    pub fn remediation(&self) -> Option<String> {
        let text = match self {
            ShiprError::InvalidIntentFormat(_) => {
                "Use a conventional commit message, e.g. `shipr \"feat: add widget\"` or\n\
                 `shipr \"fix(parser): handle empty input\"`. Pass --force to override."
                    .to_string()
            }
            ShiprError::MissingPrerequisite(p) => match p {
                Prerequisite::HostCli => {
                    "Install it from https://cli.github.com, then run `gh auth login`.".to_string()
                }
                Prerequisite::HostAuthentication => "Run `gh auth login` first.".to_string(),
                Prerequisite::OriginRemote => {
                    "Add one with `git remote add origin <url>`.".to_string()
                }
                Prerequisite::NoOperationInProgress(op) => op.remediation().to_string(),
                Prerequisite::NamedBranch => {
                    "Switch to a branch with `git switch <branch>` (or create one with `git switch -c <branch>`)."
                        .to_string()
                }
            },
            ShiprError::UnknownBaseBranch(_) => {
                "List the remote branches with `git ls-remote --heads origin` and pass one of them to --base."
                    .to_string()
            }
            ShiprError::UnpushedDefaultBranchCommits { branch, .. } => format!(
                "Push them:    git push origin {branch}\n\
                 or discard:   git reset --hard origin/{branch}\n\
                 then re-run shipr."
            ),
            ShiprError::UnexpectedDivergence { branch, .. } => format!(
                "Reconcile the branches manually (`git pull --rebase origin {branch}`), then re-run shipr."
            ),
            ShiprError::EmptyCommit { .. } => {
                "Nothing was staged (are the changes ignored by .gitignore?). You are back on your previous branch."
                    .to_string()
            }
            ShiprError::InvalidOrCollidingBranchName { .. } => {
                "Choose a different --branch name, or omit --branch to generate one.".to_string()
            }
            ShiprError::CannotUpdateMergedRequest { .. } => {
                "Start a new pull request from the current state with `shipr --new \"<description>\"`."
                    .to_string()
            }
            ShiprError::DirtyTreeDuringSync => {
                "Commit or stash your changes (`git stash`), or re-run without --sync.".to_string()
            }
            ShiprError::RemoteHasUnseenCommits { branch } => format!(
                "Integrate the remote commits first: `git pull --rebase origin {branch}`, then re-run with --sync."
            ),
            ShiprError::RebaseConflict { .. } => {
                "Resolve the conflicts and run `git rebase --continue`, or give up with `git rebase --abort`.\n\
                 Then re-run shipr."
                    .to_string()
            }
            ShiprError::PushRejected { branch, .. } => format!(
                "Inspect the remote with `git fetch origin && git log HEAD..origin/{branch}`, then re-run shipr."
            ),
            ShiprError::Io(_)
            | ShiprError::Json(_)
            | ShiprError::GitError(_)
            | ShiprError::GhError(_)
            | ShiprError::Config(_) => return None,
        };
        Some(text)
    }
}

pub type Result<T> = std::result::Result<T, ShiprError>;
