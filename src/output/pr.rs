//! Run result output.
//!
//! The final result of a run is the only human output printed on stdout.

use super::colors::*;
use crate::flow::NoOpReason;
use crate::gh::PrResult;
use crate::runner::{RunOutcome, RunResult};

const BOX_INNER_WIDTH: usize = 56;

fn boxed_title(title: &str) -> [String; 3] {
    let padding = BOX_INNER_WIDTH.saturating_sub(title.chars().count() + 2);
    [
        format!("╔{}╗", "═".repeat(BOX_INNER_WIDTH)),
        format!("║  {}{}║", title, " ".repeat(padding)),
        format!("╚{}╝", "═".repeat(BOX_INNER_WIDTH)),
    ]
}

fn print_box(color: &str, title: &str, url: &str) {
    println!();
    for line in boxed_title(title) {
        println!("{color}{BOLD}{}{RESET}", line);
    }
    println!();
    println!("{color}{BOLD}  {}{RESET}", url);
    println!();
}

/// Print a prominent message for the pull request a run ended with.
pub fn print_pr_result(pr: &PrResult) {
    match pr {
        PrResult::Created(url) => print_box(GREEN, "✓ Pull Request Created", url),
        PrResult::Updated(url) => print_box(GREEN, "✓ Pull Request Updated", url),
        PrResult::AlreadyExists(url) => print_box(CYAN, "ℹ Pull Request Already Exists", url),
    }
}

/// Print why nothing was done.
pub fn print_noop(reason: NoOpReason) {
    println!("{GRAY}Nothing to do: {}{RESET}", reason);
}

/// Print the human summary of a finished run.
pub fn print_outcome(outcome: &RunOutcome) {
    match &outcome.result {
        RunResult::NoOp { reason } => print_noop(*reason),
        RunResult::Shipped {
            committed, pushed, ..
        } => {
            let mut summary = format!(
                "{CYAN}{}{RESET} {GRAY}→{RESET} {CYAN}{}{RESET}",
                outcome.branch, outcome.base
            );
            if *committed {
                summary.push_str(&format!(" {GRAY}(new commit){RESET}"));
            }
            if let Some(mode) = pushed {
                summary.push_str(&format!(" {GRAY}[{}]{RESET}", mode));
            }
            println!("{}", summary);
            if let Some(pr) = outcome.pr() {
                print_pr_result(pr);
            }
        }
    }
}
