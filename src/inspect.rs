//! Read-only views over the repository and the review host.
//!
//! Nothing here is cached: every call asks the collaborator again, so a value
//! read before a mutation is never reused after it.

use crate::error::{Prerequisite, Result, ShiprError};
use crate::gh::{PullRequestInfo, ReviewHost};
use crate::git::{remote_ref, CommitInfo, GitBackend};
use serde::Serialize;
use tracing::debug;

/// Point-in-time snapshot of the repository relative to a base branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryState {
    pub current_branch: String,
    pub default_branch: String,
    pub is_dirty: bool,
    pub commits_ahead_of_base: u32,
    pub commits_behind_base: u32,
    /// Only meaningful when `current_branch == default_branch`
    pub local_default_ahead_of_remote: u32,
}

pub struct RepoInspector<'a> {
    git: &'a dyn GitBackend,
}

impl<'a> RepoInspector<'a> {
    pub fn new(git: &'a dyn GitBackend) -> Self {
        Self { git }
    }

    /// Current branch; a detached HEAD is a missing prerequisite.
    pub fn current_branch(&self) -> Result<String> {
        self.git
            .current_branch()?
            .ok_or(ShiprError::MissingPrerequisite(Prerequisite::NamedBranch))
    }

    pub fn default_branch(&self) -> Result<String> {
        self.git.default_branch()
    }

    pub fn is_dirty(&self) -> Result<bool> {
        Ok(!self.git.is_clean()?)
    }

    /// Commits on HEAD not reachable from `origin/<base>`.
    pub fn commits_ahead_of(&self, base: &str) -> Result<u32> {
        self.git.count_commits(&remote_ref(base), "HEAD")
    }

    /// Commits on `origin/<base>` not reachable from HEAD.
    pub fn commits_behind(&self, base: &str) -> Result<u32> {
        self.git.count_commits("HEAD", &remote_ref(base))
    }

    /// Local commits on `branch` that origin has not seen.
    pub fn unpushed_commits(&self, branch: &str) -> Result<Vec<CommitInfo>> {
        self.git.list_commits(&remote_ref(branch), branch)
    }

    /// Full snapshot. Assumes `base` (and the default branch) were fetched.
    pub fn snapshot(&self, base: &str) -> Result<RepositoryState> {
        let current_branch = self.current_branch()?;
        let default_branch = self.default_branch()?;
        let local_default_ahead_of_remote = if current_branch == default_branch {
            self.git
                .count_commits(&remote_ref(&default_branch), &default_branch)?
        } else {
            0
        };

        let state = RepositoryState {
            is_dirty: self.is_dirty()?,
            commits_ahead_of_base: self.commits_ahead_of(base)?,
            commits_behind_base: self.commits_behind(base)?,
            local_default_ahead_of_remote,
            current_branch,
            default_branch,
        };
        debug!(?state, "repository snapshot");
        Ok(state)
    }
}

pub struct ReviewInspector<'a> {
    host: &'a dyn ReviewHost,
}

impl<'a> ReviewInspector<'a> {
    pub fn new(host: &'a dyn ReviewHost) -> Self {
        Self { host }
    }

    pub fn request_for(&self, branch: &str) -> Result<Option<PullRequestInfo>> {
        self.host.find_request(branch)
    }

    pub fn open_url(&self, branch: &str) -> Result<Option<String>> {
        self.host.open_request_url(branch)
    }
}
