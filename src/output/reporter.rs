//! Live terminal view of a run.

use super::banner::{print_flow_banner, BannerColor};
use super::colors::*;
use super::messages::{print_info, print_warning};
use crate::executor::Action;
use crate::flow::{Flow, Notice};
use crate::reporter::{ActionStatus, FlowReporter};
use crate::state::Step;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::time::Duration;

const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Prints progress on stderr, with a spinner while network actions block.
pub struct TerminalReporter {
    verbose: bool,
    spinner: RefCell<Option<ProgressBar>>,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            verbose: false,
            spinner: RefCell::new(None),
        }
    }

    /// Also print every controller step.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn start_spinner(&self, message: String) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars(SPINNER_CHARS)
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(80));
        *self.spinner.borrow_mut() = Some(spinner);
    }

    fn clear_spinner(&self) {
        if let Some(spinner) = self.spinner.borrow_mut().take() {
            spinner.finish_and_clear();
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowReporter for TerminalReporter {
    fn on_flow(&self, flow: Flow) {
        match flow {
            Flow::NewRequest => print_flow_banner("NEW REQUEST", BannerColor::Cyan),
            Flow::UpdateExisting => print_flow_banner("UPDATE EXISTING", BannerColor::Blue),
        }
    }

    fn on_step(&self, step: Step) {
        if self.verbose && !step.is_terminal() {
            eprintln!("{GRAY}› {}{RESET}", step);
        }
    }

    fn on_action(&self, action: &Action, status: &ActionStatus) {
        match status {
            ActionStatus::Started => {
                if action.is_network() {
                    self.start_spinner(action.to_string());
                }
            }
            ActionStatus::Succeeded => {
                self.clear_spinner();
                eprintln!("{GREEN}✔{RESET} {}", action);
            }
            ActionStatus::Failed(_) => {
                self.clear_spinner();
                eprintln!("{RED}✘{RESET} {}", action);
            }
        }
    }

    fn on_notice(&self, notice: &Notice) {
        self.clear_spinner();
        match notice {
            Notice::RolledBack { .. } => print_info(&notice.to_string()),
            _ => print_warning(&notice.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_lifecycle_around_network_action() {
        let reporter = TerminalReporter::new();
        let fetch = Action::Fetch {
            branch: "main".to_string(),
        };

        reporter.on_action(&fetch, &ActionStatus::Started);
        assert!(reporter.spinner.borrow().is_some());

        reporter.on_action(&fetch, &ActionStatus::Succeeded);
        assert!(reporter.spinner.borrow().is_none());
    }

    #[test]
    fn test_local_actions_do_not_spin() {
        let reporter = TerminalReporter::new();
        reporter.on_action(&Action::StageAll, &ActionStatus::Started);
        assert!(reporter.spinner.borrow().is_none());
        reporter.on_action(&Action::StageAll, &ActionStatus::Failed("boom".into()));
    }

    #[test]
    fn test_notice_clears_spinner() {
        let reporter = TerminalReporter::new().with_verbose(true);
        reporter.on_step(Step::CheckingBehind);
        reporter.on_action(
            &Action::Fetch {
                branch: "main".to_string(),
            },
            &ActionStatus::Started,
        );
        reporter.on_notice(&Notice::BehindBase {
            base: "main".to_string(),
            commits: 3,
        });
        assert!(reporter.spinner.borrow().is_none());
    }
}
