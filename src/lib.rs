pub mod branch_name;
pub mod cli;
pub mod commands;
pub mod completion;
pub mod config;
pub mod error;
pub mod executor;
pub mod flow;
pub mod gh;
pub mod git;
pub mod inspect;
pub mod intent;
pub mod output;
pub mod reporter;
pub mod runner;
pub mod state;

pub use branch_name::{BranchName, BranchNamer, Clock};
pub use error::{Result, ShiprError};
pub use flow::{ExecutionFlags, Flow, NoOpReason, Notice};
pub use gh::{GhCli, PrResult, ReviewHost};
pub use git::{GitBackend, GitCli, PushMode};
pub use reporter::{FlowReporter, NoopReporter};
pub use runner::{RunOutcome, RunResult, Runner};
pub use state::{RunState, RunStatus, Step};
