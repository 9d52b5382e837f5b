//! GitHub CLI integration for pull request operations.
//!
//! # Modules
//!
//! - [`types`] - Review state and pull request types
//! - [`format`] - PR title and body formatting
//! - [`detection`] - Looking up the pull request for a branch
//! - [`pr`] - Authentication and PR creation, and the [`GhCli`] backend

mod detection;
mod format;
mod pr;
mod types;

pub use detection::most_relevant_request;
pub use format::{format_pr_body, format_pr_title};
pub use pr::GhCli;
pub use types::{PrResult, PullRequestDraft, PullRequestInfo, ReviewState};

use crate::error::Result;

/// Review-host operations consumed by the flow controller.
pub trait ReviewHost {
    /// Whether the host session is authenticated
    fn is_authenticated(&self) -> Result<bool>;

    /// The most relevant pull request whose head is `branch`, in any state
    fn find_request(&self, branch: &str) -> Result<Option<PullRequestInfo>>;

    /// Open a pull request and return its URL
    fn create_request(&self, draft: &PullRequestDraft) -> Result<String>;

    /// URL of the open pull request for `branch`, if any
    fn open_request_url(&self, branch: &str) -> Result<Option<String>> {
        Ok(self
            .find_request(branch)?
            .filter(|pr| pr.state == ReviewState::Open)
            .map(|pr| pr.url))
    }
}
