//! Core types for GitHub PR operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the pull request associated with a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewState {
    None,
    Open,
    Merged,
    Closed,
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewState::None => write!(f, "none"),
            ReviewState::Open => write!(f, "open"),
            ReviewState::Merged => write!(f, "merged"),
            ReviewState::Closed => write!(f, "closed"),
        }
    }
}

/// A pull request as reported by `gh pr list --json`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestInfo {
    /// PR number
    pub number: u64,
    /// PR title
    #[serde(default)]
    pub title: String,
    /// Head branch name (the source branch)
    pub head_ref_name: String,
    /// PR URL
    pub url: String,
    pub state: ReviewState,
}

/// Everything needed to open a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestDraft {
    pub title: String,
    pub body: String,
    /// Target branch
    pub base: String,
    /// Source branch
    pub head: String,
    /// Open as a draft
    pub draft: bool,
}

/// What happened to the pull request at the end of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "url", rename_all = "kebab-case")]
pub enum PrResult {
    /// PR created, contains PR URL
    Created(String),
    /// An open PR already existed for a freshly pushed branch
    AlreadyExists(String),
    /// New commits were pushed to the branch of an open PR
    Updated(String),
}

impl PrResult {
    pub fn url(&self) -> &str {
        match self {
            PrResult::Created(url) | PrResult::AlreadyExists(url) | PrResult::Updated(url) => url,
        }
    }
}
