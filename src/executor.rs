//! Side-effecting actions and rollback.
//!
//! The executor performs exactly the action it is handed. It carries no
//! decision logic beyond translating a collaborator failure into the error
//! kind of the guard that owns the action.

use crate::error::{Result, ShiprError};
use crate::flow::Notice;
use crate::gh::{PullRequestDraft, ReviewHost};
use crate::git::{remote_ref, GitBackend, PushMode};
use crate::reporter::{ActionStatus, FlowReporter};
use std::fmt;
use tracing::{debug, error, info};

/// One side-effecting step against git or the review host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Fetch { branch: String },
    /// Fast-forward the current branch to `origin/<branch>`
    FastForward { branch: String },
    CreateBranch { name: String },
    StageAll,
    Commit { message: String },
    /// Rebase HEAD onto `origin/<onto>`
    Rebase { onto: String },
    Push { branch: String, mode: PushMode },
    OpenRequest(PullRequestDraft),
}

impl Action {
    /// Actions that talk to the network and may take a while.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Action::Fetch { .. } | Action::Push { .. } | Action::OpenRequest(_)
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Fetch { branch } => write!(f, "fetch {}", remote_ref(branch)),
            Action::FastForward { branch } => write!(f, "fast-forward to {}", remote_ref(branch)),
            Action::CreateBranch { name } => write!(f, "create branch {}", name),
            Action::StageAll => write!(f, "stage all changes"),
            Action::Commit { message } => {
                write!(f, "commit \"{}\"", message.lines().next().unwrap_or_default())
            }
            Action::Rebase { onto } => write!(f, "rebase onto {}", remote_ref(onto)),
            Action::Push { branch, mode } => write!(f, "{} {}", mode, branch),
            Action::OpenRequest(draft) => {
                if draft.draft {
                    write!(f, "open draft pull request {} -> {}", draft.head, draft.base)
                } else {
                    write!(f, "open pull request {} -> {}", draft.head, draft.base)
                }
            }
        }
    }
}

/// What to undo if a run fails after creating its branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub prior_branch: String,
    pub created_branch: String,
    /// HEAD before the branch was created
    pub start_commit: String,
    pub committed: bool,
}

impl Checkpoint {
    pub fn new(prior_branch: String, created_branch: String, start_commit: String) -> Self {
        Self {
            prior_branch,
            created_branch,
            start_commit,
            committed: false,
        }
    }
}

pub struct Executor<'a> {
    git: &'a dyn GitBackend,
    host: &'a dyn ReviewHost,
    reporter: &'a dyn FlowReporter,
    checkpoint: Option<Checkpoint>,
}

impl<'a> Executor<'a> {
    pub fn new(
        git: &'a dyn GitBackend,
        host: &'a dyn ReviewHost,
        reporter: &'a dyn FlowReporter,
    ) -> Self {
        Self {
            git,
            host,
            reporter,
            checkpoint: None,
        }
    }

    /// Run a git action. The first failure halts the run.
    pub fn execute(&mut self, action: Action) -> Result<()> {
        self.perform(action).map(|_| ())
    }

    /// Open a pull request and return its URL.
    pub fn open_request(&mut self, draft: PullRequestDraft) -> Result<String> {
        let url = self.perform(Action::OpenRequest(draft))?;
        url.ok_or_else(|| ShiprError::GhError("gh did not report a pull request URL".to_string()))
    }

    fn perform(&mut self, action: Action) -> Result<Option<String>> {
        debug!(%action, "executing");
        self.reporter.on_action(&action, &ActionStatus::Started);

        let result = self.dispatch(&action);

        match &result {
            Ok(_) => {
                if matches!(action, Action::Commit { .. }) {
                    if let Some(checkpoint) = self.checkpoint.as_mut() {
                        checkpoint.committed = true;
                    }
                }
                self.reporter.on_action(&action, &ActionStatus::Succeeded);
            }
            Err(e) => {
                self.reporter
                    .on_action(&action, &ActionStatus::Failed(e.to_string()));
            }
        }

        result
    }

    fn dispatch(&self, action: &Action) -> Result<Option<String>> {
        match action {
            Action::Fetch { branch } => self.git.fetch(branch)?,
            Action::FastForward { branch } => self
                .git
                .merge_ff_only(&remote_ref(branch))
                .map_err(|e| match e {
                    ShiprError::GitError(detail) => ShiprError::UnexpectedDivergence {
                        branch: branch.clone(),
                        detail,
                    },
                    other => other,
                })?,
            Action::CreateBranch { name } => self.git.create_branch(name)?,
            Action::StageAll => self.git.stage_all()?,
            Action::Commit { message } => self.git.commit(message)?,
            Action::Rebase { onto } => {
                self.git
                    .rebase(&remote_ref(onto))
                    .map_err(|e| match e {
                        ShiprError::GitError(detail) => ShiprError::RebaseConflict {
                            onto: remote_ref(onto),
                            detail,
                        },
                        other => other,
                    })?
            }
            Action::Push { branch, mode } => {
                self.git.push(branch, *mode).map_err(|e| match e {
                    ShiprError::GitError(detail) => ShiprError::PushRejected {
                        branch: branch.clone(),
                        detail,
                    },
                    other => other,
                })?
            }
            Action::OpenRequest(draft) => return self.host.create_request(draft).map(Some),
        }
        Ok(None)
    }

    /// Start tracking a freshly created branch for rollback.
    pub fn arm(&mut self, checkpoint: Checkpoint) {
        debug!(?checkpoint, "rollback armed");
        self.checkpoint = Some(checkpoint);
    }

    /// The branch is safely pushed; failures from here on keep it.
    pub fn disarm(&mut self) {
        self.checkpoint = None;
    }

    /// Undo a half-finished branch: soft-reset any commit so the changes stay
    /// staged, return to the prior branch and delete the new one.
    ///
    /// Returns a notice when the repository was fully restored. Rollback
    /// failures are logged; the caller still reports the original error.
    pub fn rollback(&mut self) -> Option<Notice> {
        let checkpoint = self.checkpoint.take()?;
        info!(branch = %checkpoint.created_branch, "rolling back");

        if checkpoint.committed {
            if let Err(e) = self.git.reset_soft(&checkpoint.start_commit) {
                error!(error = %e, "rollback: soft reset failed");
                return None;
            }
        }

        if let Err(e) = self.git.checkout(&checkpoint.prior_branch) {
            error!(error = %e, branch = %checkpoint.prior_branch, "rollback: checkout failed");
            return None;
        }

        if let Err(e) = self.git.delete_branch(&checkpoint.created_branch) {
            error!(error = %e, branch = %checkpoint.created_branch, "rollback: branch delete failed");
            return None;
        }

        let notice = Notice::RolledBack {
            branch: checkpoint.created_branch,
            restored: checkpoint.prior_branch,
        };
        self.reporter.on_notice(&notice);
        Some(notice)
    }
}
