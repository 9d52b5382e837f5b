use crate::flow::{Flow, Notice};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    Running,
    Completed,
    NoOp,
    Failed,
}

/// Every state the controller passes through, in the order a run can visit them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    ValidatingIntent,
    CheckingPreconditions,
    ResolvingBase,
    SelectingFlow,

    // New-Request
    FetchingBase,
    InspectingTree,
    ResolvingBranchName,
    SyncingDefaultBranch,
    CreatingBranch,
    Committing,
    Pushing,
    OpeningRequest,

    // Update-Existing
    CheckingRequestState,
    CheckingBehind,
    Syncing,
    Staging,
    PushingUpdate,
    FinalizingRequest,

    Completed,
    NoOp,
    Failed,
}

impl Step {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Completed | Step::NoOp | Step::Failed)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::ValidatingIntent => "Validating change description",
            Step::CheckingPreconditions => "Checking preconditions",
            Step::ResolvingBase => "Resolving base branch",
            Step::SelectingFlow => "Selecting flow",
            Step::FetchingBase => "Fetching base branch",
            Step::InspectingTree => "Inspecting working tree",
            Step::ResolvingBranchName => "Resolving branch name",
            Step::SyncingDefaultBranch => "Fast-forwarding default branch",
            Step::CreatingBranch => "Creating branch",
            Step::Committing => "Committing changes",
            Step::Pushing => "Pushing branch",
            Step::OpeningRequest => "Opening pull request",
            Step::CheckingRequestState => "Checking pull request state",
            Step::CheckingBehind => "Comparing with base branch",
            Step::Syncing => "Rebasing onto base branch",
            Step::Staging => "Staging changes",
            Step::PushingUpdate => "Pushing update",
            Step::FinalizingRequest => "Finalizing pull request",
            Step::Completed => "Completed",
            Step::NoOp => "Nothing to do",
            Step::Failed => "Failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub from: Step,
    pub to: Step,
    pub at: DateTime<Utc>,
}

/// In-memory record of one invocation. Nothing is persisted between runs.
#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    pub status: RunStatus,
    pub step: Step,
    pub flow: Option<Flow>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub history: Vec<Transition>,
    pub notices: Vec<Notice>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            status: RunStatus::Running,
            step: Step::ValidatingIntent,
            flow: None,
            started_at: Utc::now(),
            finished_at: None,
            history: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn transition_to(&mut self, step: Step) {
        self.history.push(Transition {
            from: self.step,
            to: step,
            at: Utc::now(),
        });
        self.step = step;
        match step {
            Step::Completed => {
                self.status = RunStatus::Completed;
                self.finished_at = Some(Utc::now());
            }
            Step::NoOp => {
                self.status = RunStatus::NoOp;
                self.finished_at = Some(Utc::now());
            }
            Step::Failed => {
                self.status = RunStatus::Failed;
                self.finished_at = Some(Utc::now());
            }
            _ => {}
        }
    }

    pub fn select_flow(&mut self, flow: Flow) {
        self.flow = Some(flow);
    }

    pub fn add_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Whether the run ever entered `step`.
    pub fn visited(&self, step: Step) -> bool {
        self.step == step || self.history.iter().any(|t| t.from == step || t.to == step)
    }

    /// Steps in visiting order, starting with the initial one.
    pub fn path(&self) -> Vec<Step> {
        match self.history.first() {
            Some(first) => std::iter::once(first.from)
                .chain(self.history.iter().map(|t| t.to))
                .collect(),
            None => vec![self.step],
        }
    }

    pub fn duration_secs(&self) -> u64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_seconds().max(0) as u64
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
