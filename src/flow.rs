//! Flow selection and the guards that decide between acting and doing nothing.
//!
//! Everything here is pure so the decision table can be tested without a
//! repository.

use crate::git::PushMode;
use serde::Serialize;
use std::fmt;

/// The two top-level flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flow {
    /// Cut a new branch from HEAD and open a request for it
    NewRequest,
    /// Push more work to the current branch and its request
    UpdateExisting,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::NewRequest => write!(f, "new request"),
            Flow::UpdateExisting => write!(f, "update existing"),
        }
    }
}

/// Caller-supplied options for one run, after config defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionFlags {
    /// Rebase onto base before pushing; requires a clean tree
    pub sync: bool,
    /// Force the New-Request flow even from a non-default branch
    pub new: bool,
    /// Caller-chosen branch name, bypasses synthesis
    pub explicit_branch: Option<String>,
    /// Bypass the conventional-commit grammar check
    pub force: bool,
    /// Open a newly created request as draft
    pub draft: bool,
    /// Target branch other than the default
    pub base_override: Option<String>,
}

pub fn select_flow(current_branch: &str, default_branch: &str, force_new: bool) -> Flow {
    if current_branch == default_branch || force_new {
        Flow::NewRequest
    } else {
        Flow::UpdateExisting
    }
}

/// Why a run finished without touching anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoOpReason {
    /// On the default branch with a clean tree
    CleanDefaultBranch,
    /// `--new` with a clean tree and no commits ahead of base
    EmptyRequest,
    /// Nothing staged, nothing ahead, no sync
    NothingToPush,
}

impl fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoOpReason::CleanDefaultBranch => {
                write!(f, "working tree is clean on the default branch; nothing to ship")
            }
            NoOpReason::EmptyRequest => {
                write!(f, "no changes and no commits ahead of base; the request would be empty")
            }
            NoOpReason::NothingToPush => {
                write!(f, "nothing to commit and no commits ahead of the remote branch")
            }
        }
    }
}

/// Non-fatal events surfaced to the user. They never change the exit status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Notice {
    /// The description failed the grammar but `--force` let it through
    IntentOverridden { description: String },
    /// The branch's request was closed; a fresh one is opened after pushing
    ClosedRequest { branch: String, url: String },
    /// Base has moved on and `--sync` was not requested
    BehindBase { base: String, commits: u32 },
    /// A failed run restored the prior branch
    RolledBack { branch: String, restored: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::IntentOverridden { description } => write!(
                f,
                "{:?} is not a conventional commit message; continuing because of --force",
                description
            ),
            Notice::ClosedRequest { branch, url } => write!(
                f,
                "The pull request for '{}' was closed ({}); a new one will be opened after pushing",
                branch, url
            ),
            Notice::BehindBase { base, commits } => write!(
                f,
                "Branch is {} commit(s) behind origin/{}; re-run with --sync to rebase",
                commits, base
            ),
            Notice::RolledBack { branch, restored } => write!(
                f,
                "Rolled back: deleted local branch '{}' and returned to '{}'",
                branch, restored
            ),
        }
    }
}

/// No-op guards of the New-Request flow, checked in order.
pub fn new_request_noop(
    on_default_branch: bool,
    force_new: bool,
    is_dirty: bool,
    commits_ahead: u32,
) -> Option<NoOpReason> {
    if on_default_branch && !is_dirty {
        return Some(NoOpReason::CleanDefaultBranch);
    }
    if force_new && !is_dirty && commits_ahead == 0 {
        return Some(NoOpReason::EmptyRequest);
    }
    None
}

/// Whether an Update-Existing run has nothing to do.
pub fn update_is_noop(staged: bool, commits_ahead: u32, sync: bool) -> bool {
    !staged && commits_ahead == 0 && !sync
}

/// How (and whether) an Update-Existing run pushes.
pub fn update_push_mode(sync: bool, commits_ahead: u32) -> Option<PushMode> {
    if sync {
        Some(PushMode::ForceWithLease)
    } else if commits_ahead > 0 {
        Some(PushMode::Tracking)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_branch_selects_new_request() {
        assert_eq!(select_flow("main", "main", false), Flow::NewRequest);
    }

    #[test]
    fn test_new_flag_selects_new_request_from_feature_branch() {
        assert_eq!(select_flow("feat-x", "main", true), Flow::NewRequest);
    }

    #[test]
    fn test_feature_branch_selects_update() {
        assert_eq!(select_flow("feat-x", "main", false), Flow::UpdateExisting);
    }

    #[test]
    fn test_clean_default_branch_is_noop() {
        assert_eq!(
            new_request_noop(true, false, false, 3),
            Some(NoOpReason::CleanDefaultBranch)
        );
        assert_eq!(new_request_noop(true, false, true, 0), None);
    }

    #[test]
    fn test_empty_new_request_is_noop() {
        assert_eq!(
            new_request_noop(false, true, false, 0),
            Some(NoOpReason::EmptyRequest)
        );
        assert_eq!(new_request_noop(false, true, false, 2), None);
        assert_eq!(new_request_noop(false, true, true, 0), None);
    }

    #[test]
    fn test_update_noop_table() {
        assert!(update_is_noop(false, 0, false));
        assert!(!update_is_noop(true, 0, false));
        assert!(!update_is_noop(false, 1, false));
        assert!(!update_is_noop(false, 0, true));
    }

    #[test]
    fn test_update_push_mode() {
        assert_eq!(update_push_mode(true, 0), Some(PushMode::ForceWithLease));
        assert_eq!(update_push_mode(true, 4), Some(PushMode::ForceWithLease));
        assert_eq!(update_push_mode(false, 2), Some(PushMode::Tracking));
        assert_eq!(update_push_mode(false, 0), None);
    }

    #[test]
    fn test_notice_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Notice::BehindBase {
            base: "main".to_string(),
            commits: 2,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"behind-base","base":"main","commits":2}"#);
    }
}
