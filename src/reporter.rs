//! Progress reporting hooks for a run.

use crate::executor::Action;
use crate::flow::{Flow, Notice};
use crate::state::Step;

/// Outcome of a single executor action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStatus {
    Started,
    Succeeded,
    Failed(String),
}

/// Observer for run progress. All methods default to doing nothing.
pub trait FlowReporter {
    /// Called once the flow has been selected
    fn on_flow(&self, _flow: Flow) {}

    /// Called when the controller enters a new step
    fn on_step(&self, _step: Step) {}

    /// Called before and after every side-effecting action
    fn on_action(&self, _action: &Action, _status: &ActionStatus) {}

    /// Called for informational, non-fatal events
    fn on_notice(&self, _notice: &Notice) {}
}

/// Reporter that ignores everything; used by tests and `--json` runs.
pub struct NoopReporter;

impl FlowReporter for NoopReporter {}
