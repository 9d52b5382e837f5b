use crate::branch_name::{has_forbidden_ref_chars, BranchName, BranchNamer};
use crate::error::{BranchNameProblem, Prerequisite, Result, ShiprError};
use crate::executor::{Action, Checkpoint, Executor};
use crate::flow::{
    new_request_noop, select_flow, update_is_noop, update_push_mode, ExecutionFlags, Flow,
    NoOpReason, Notice,
};
use crate::gh::{
    format_pr_body, format_pr_title, PrResult, PullRequestDraft, ReviewHost, ReviewState,
};
use crate::git::{remote_ref, GitBackend, PushMode};
use crate::inspect::{RepoInspector, ReviewInspector};
use crate::intent::{ChangeDescription, IntentVerdict};
use crate::reporter::{FlowReporter, NoopReporter};
use crate::state::{RunState, Step};
use serde::Serialize;
use tracing::{info, warn};

// ============================================================================
// Outcome
// ============================================================================

/// How a run ended, short of a fatal error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum RunResult {
    NoOp {
        reason: NoOpReason,
    },
    Shipped {
        committed: bool,
        pushed: Option<PushMode>,
        pr: PrResult,
    },
}

/// Summary of a successful or no-op run, printed as JSON with `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub flow: Flow,
    /// Branch the run ended on
    pub branch: String,
    pub base: String,
    pub notices: Vec<Notice>,
    #[serde(flatten)]
    pub result: RunResult,
}

impl RunOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self.result, RunResult::NoOp { .. })
    }

    pub fn pr(&self) -> Option<&PrResult> {
        match &self.result {
            RunResult::Shipped { pr, .. } => Some(pr),
            RunResult::NoOp { .. } => None,
        }
    }
}

/// Values fixed before the flow-specific steps start.
struct Resolved {
    description: ChangeDescription,
    current: String,
    default_branch: String,
    base: String,
}

// ============================================================================
// Runner
// ============================================================================

/// Drives one invocation from validation to a pushed branch and pull request.
pub struct Runner<'a> {
    git: &'a dyn GitBackend,
    host: &'a dyn ReviewHost,
    reporter: &'a dyn FlowReporter,
    namer: BranchNamer,
    state: RunState,
}

impl<'a> Runner<'a> {
    pub fn new(git: &'a dyn GitBackend, host: &'a dyn ReviewHost) -> Self {
        Self {
            git,
            host,
            reporter: &NoopReporter,
            namer: BranchNamer::system(),
            state: RunState::new(),
        }
    }

    pub fn with_reporter(mut self, reporter: &'a dyn FlowReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_namer(mut self, namer: BranchNamer) -> Self {
        self.namer = namer;
        self
    }

    /// State of the most recent run, including its transition history.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn run(&mut self, description: &str, flags: &ExecutionFlags) -> Result<RunOutcome> {
        self.state = RunState::new();
        self.reporter.on_step(Step::ValidatingIntent);

        let mut exec = Executor::new(self.git, self.host, self.reporter);
        let result = self.drive(&mut exec, description, flags);

        if let Err(e) = &result {
            warn!(kind = e.kind(), "run failed");
            self.enter(Step::Failed);
        }
        result
    }

    fn drive(
        &mut self,
        exec: &mut Executor,
        description: &str,
        flags: &ExecutionFlags,
    ) -> Result<RunOutcome> {
        let (description, verdict) = ChangeDescription::accept(description, flags.force)?;
        if verdict == IntentVerdict::AcceptedWithWarning {
            self.notify(Notice::IntentOverridden {
                description: description.to_string(),
            });
        }

        self.enter(Step::CheckingPreconditions);
        let current = self.check_preconditions()?;

        self.enter(Step::ResolvingBase);
        let default_branch = RepoInspector::new(self.git).default_branch()?;
        let base = self.resolve_base(flags, &default_branch)?;

        self.enter(Step::SelectingFlow);
        let flow = select_flow(&current, &default_branch, flags.new);
        info!(%flow, %current, %default_branch, %base, "flow selected");
        self.state.select_flow(flow);
        self.reporter.on_flow(flow);

        let resolved = Resolved {
            description,
            current,
            default_branch,
            base,
        };

        match flow {
            Flow::NewRequest => self.new_request(exec, resolved, flags),
            Flow::UpdateExisting => self.update_existing(exec, resolved, flags),
        }
    }

    /// Nothing may be mutated until every check here passes.
    fn check_preconditions(&mut self) -> Result<String> {
        if !self.host.is_authenticated()? {
            return Err(ShiprError::MissingPrerequisite(
                Prerequisite::HostAuthentication,
            ));
        }
        if !self.git.has_origin()? {
            return Err(ShiprError::MissingPrerequisite(Prerequisite::OriginRemote));
        }
        if let Some(op) = self.git.operation_in_progress()? {
            return Err(ShiprError::MissingPrerequisite(
                Prerequisite::NoOperationInProgress(op),
            ));
        }
        RepoInspector::new(self.git).current_branch()
    }

    fn resolve_base(&mut self, flags: &ExecutionFlags, default_branch: &str) -> Result<String> {
        match &flags.base_override {
            Some(base) => {
                if !self.git.remote_branch_exists(base)? {
                    return Err(ShiprError::UnknownBaseBranch(base.clone()));
                }
                Ok(base.clone())
            }
            None => Ok(default_branch.to_string()),
        }
    }

    // ========================================================================
    // New-Request flow
    // ========================================================================

    fn new_request(
        &mut self,
        exec: &mut Executor,
        resolved: Resolved,
        flags: &ExecutionFlags,
    ) -> Result<RunOutcome> {
        let Resolved {
            description,
            current,
            default_branch,
            base,
        } = resolved;
        let repo = RepoInspector::new(self.git);
        let on_default = current == default_branch;

        self.enter(Step::FetchingBase);
        exec.execute(Action::Fetch {
            branch: base.clone(),
        })?;
        if on_default && base != default_branch {
            exec.execute(Action::Fetch {
                branch: default_branch.clone(),
            })?;
        }

        self.enter(Step::InspectingTree);
        let snapshot = repo.snapshot(&base)?;
        if let Some(reason) = new_request_noop(
            on_default,
            flags.new,
            snapshot.is_dirty,
            snapshot.commits_ahead_of_base,
        ) {
            return Ok(self.finish_noop(Flow::NewRequest, current, base, reason));
        }

        self.enter(Step::ResolvingBranchName);
        let branch = self.resolve_branch_name(&description, flags)?.into_string();
        info!(%branch, "branch name resolved");

        if on_default {
            self.enter(Step::SyncingDefaultBranch);
            let unpushed = repo.unpushed_commits(&default_branch)?;
            if !unpushed.is_empty() {
                return Err(ShiprError::UnpushedDefaultBranchCommits {
                    branch: default_branch,
                    commits: unpushed,
                });
            }
            exec.execute(Action::FastForward {
                branch: default_branch.clone(),
            })?;
        }

        self.enter(Step::CreatingBranch);
        let start_commit = self.git.head_commit()?;
        exec.execute(Action::CreateBranch {
            name: branch.clone(),
        })?;
        exec.arm(Checkpoint::new(current, branch.clone(), start_commit));

        let committed = match self.commit_and_push(exec, &description, &branch) {
            Ok(committed) => committed,
            Err(e) => {
                if let Some(notice) = exec.rollback() {
                    warn!("{}", notice);
                    self.state.add_notice(notice);
                }
                return Err(e);
            }
        };
        exec.disarm();

        self.enter(Step::OpeningRequest);
        let pr = match ReviewInspector::new(self.host).open_url(&branch)? {
            Some(url) => PrResult::AlreadyExists(url),
            None => PrResult::Created(exec.open_request(self.draft(
                &description,
                &base,
                &branch,
                flags.draft,
            ))?),
        };

        Ok(self.finish_shipped(
            Flow::NewRequest,
            branch,
            base,
            RunResult::Shipped {
                committed,
                pushed: Some(PushMode::Tracking),
                pr,
            },
        ))
    }

    /// Commit (when dirty) and push the new branch. Failures here are rolled
    /// back by the caller.
    fn commit_and_push(
        &mut self,
        exec: &mut Executor,
        description: &ChangeDescription,
        branch: &str,
    ) -> Result<bool> {
        let mut committed = false;

        if RepoInspector::new(self.git).is_dirty()? {
            self.enter(Step::Committing);
            exec.execute(Action::StageAll)?;
            if !self.git.has_staged_changes()? {
                return Err(ShiprError::EmptyCommit {
                    branch: branch.to_string(),
                });
            }
            exec.execute(Action::Commit {
                message: description.to_string(),
            })?;
            committed = true;
        }

        self.enter(Step::Pushing);
        exec.execute(Action::Push {
            branch: branch.to_string(),
            mode: PushMode::Tracking,
        })?;

        Ok(committed)
    }

    fn resolve_branch_name(
        &mut self,
        description: &ChangeDescription,
        flags: &ExecutionFlags,
    ) -> Result<BranchName> {
        let name = match &flags.explicit_branch {
            Some(name) => {
                if has_forbidden_ref_chars(name) || !self.git.is_valid_branch_name(name)? {
                    return Err(ShiprError::InvalidOrCollidingBranchName {
                        name: name.clone(),
                        problem: BranchNameProblem::InvalidRefName,
                    });
                }
                BranchName::explicit(name.as_str())
            }
            None => self.namer.generate(description.as_str()),
        };

        // generated names are checked too; a collision there is just unlucky
        let problem = if self.git.local_branch_exists(name.as_str())? {
            Some(BranchNameProblem::ExistsLocally)
        } else if self.git.remote_branch_exists(name.as_str())? {
            Some(BranchNameProblem::ExistsOnRemote)
        } else {
            None
        };

        match problem {
            Some(problem) => Err(ShiprError::InvalidOrCollidingBranchName {
                name: name.into_string(),
                problem,
            }),
            None => Ok(name),
        }
    }

    // ========================================================================
    // Update-Existing flow
    // ========================================================================

    fn update_existing(
        &mut self,
        exec: &mut Executor,
        resolved: Resolved,
        flags: &ExecutionFlags,
    ) -> Result<RunOutcome> {
        let Resolved {
            description,
            current,
            base,
            ..
        } = resolved;
        let repo = RepoInspector::new(self.git);
        let review = ReviewInspector::new(self.host);

        self.enter(Step::CheckingRequestState);
        if let Some(request) = review.request_for(&current)? {
            match request.state {
                ReviewState::Merged => {
                    return Err(ShiprError::CannotUpdateMergedRequest {
                        branch: current,
                        url: Some(request.url),
                    });
                }
                ReviewState::Closed => self.notify(Notice::ClosedRequest {
                    branch: current.clone(),
                    url: request.url,
                }),
                ReviewState::Open | ReviewState::None => {}
            }
        }

        self.enter(Step::CheckingBehind);
        exec.execute(Action::Fetch {
            branch: base.clone(),
        })?;
        let behind = repo.commits_behind(&base)?;
        if behind > 0 && !flags.sync {
            self.notify(Notice::BehindBase {
                base: base.clone(),
                commits: behind,
            });
        }

        if flags.sync {
            self.enter(Step::Syncing);
            if repo.is_dirty()? {
                return Err(ShiprError::DirtyTreeDuringSync);
            }
        }

        let counterpart = if self.git.remote_branch_exists(&current)? {
            exec.execute(Action::Fetch {
                branch: current.clone(),
            })?;
            Some(remote_ref(&current))
        } else {
            None
        };

        if flags.sync {
            if let Some(remote) = &counterpart {
                if !self.git.is_ancestor(remote, "HEAD")? {
                    return Err(ShiprError::RemoteHasUnseenCommits {
                        branch: current,
                    });
                }
            }
            exec.execute(Action::Rebase { onto: base.clone() })?;
        }

        self.enter(Step::Staging);
        exec.execute(Action::StageAll)?;
        let staged = self.git.has_staged_changes()?;
        // a branch that was never pushed is measured against base
        let compare_to = counterpart.unwrap_or_else(|| remote_ref(&base));
        let mut ahead = self.git.count_commits(&compare_to, "HEAD")?;

        if update_is_noop(staged, ahead, flags.sync) {
            return Ok(self.finish_noop(
                Flow::UpdateExisting,
                current,
                base,
                NoOpReason::NothingToPush,
            ));
        }

        let mut committed = false;
        if staged {
            self.enter(Step::Committing);
            exec.execute(Action::Commit {
                message: description.to_string(),
            })?;
            committed = true;
            ahead = self.git.count_commits(&compare_to, "HEAD")?;
        }

        self.enter(Step::PushingUpdate);
        let pushed = update_push_mode(flags.sync, ahead);
        if let Some(mode) = pushed {
            exec.execute(Action::Push {
                branch: current.clone(),
                mode,
            })?;
        }

        self.enter(Step::FinalizingRequest);
        let pr = match review.open_url(&current)? {
            Some(url) => PrResult::Updated(url),
            None => PrResult::Created(exec.open_request(self.draft(
                &description,
                &base,
                &current,
                flags.draft,
            ))?),
        };

        Ok(self.finish_shipped(
            Flow::UpdateExisting,
            current,
            base,
            RunResult::Shipped {
                committed,
                pushed,
                pr,
            },
        ))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn enter(&mut self, step: Step) {
        info!(from = ?self.state.step, to = ?step, "transition");
        self.state.transition_to(step);
        self.reporter.on_step(step);
    }

    fn notify(&mut self, notice: Notice) {
        warn!("{}", notice);
        self.reporter.on_notice(&notice);
        self.state.add_notice(notice);
    }

    fn draft(
        &self,
        description: &ChangeDescription,
        base: &str,
        head: &str,
        draft: bool,
    ) -> PullRequestDraft {
        PullRequestDraft {
            title: format_pr_title(description.as_str()),
            body: format_pr_body(description.as_str()),
            base: base.to_string(),
            head: head.to_string(),
            draft,
        }
    }

    fn finish_noop(
        &mut self,
        flow: Flow,
        branch: String,
        base: String,
        reason: NoOpReason,
    ) -> RunOutcome {
        info!(%reason, "nothing to do");
        self.enter(Step::NoOp);
        RunOutcome {
            flow,
            branch,
            base,
            notices: self.state.notices.clone(),
            result: RunResult::NoOp { reason },
        }
    }

    fn finish_shipped(
        &mut self,
        flow: Flow,
        branch: String,
        base: String,
        result: RunResult,
    ) -> RunOutcome {
        self.enter(Step::Completed);
        RunOutcome {
            flow,
            branch,
            base,
            notices: self.state.notices.clone(),
            result,
        }
    }
}
