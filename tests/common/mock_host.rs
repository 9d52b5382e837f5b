//! Mock review host for testing.

use shipr::error::{Prerequisite, Result, ShiprError};
use shipr::gh::{PullRequestDraft, PullRequestInfo, ReviewHost, ReviewState};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub const REPO_URL: &str = "https://github.com/acme/app";

/// Review host with per-branch pull requests, call tracking and error injection.
pub struct MockReviewHost {
    installed: Cell<bool>,
    authenticated: Cell<bool>,
    next_number: Cell<u64>,
    requests: RefCell<HashMap<String, PullRequestInfo>>,
    // Call tracking
    find_calls: RefCell<Vec<String>>,
    create_calls: RefCell<Vec<PullRequestDraft>>,
    // Error injection
    error_on_create: RefCell<Option<String>>,
}

impl MockReviewHost {
    pub fn new() -> Self {
        Self {
            installed: Cell::new(true),
            authenticated: Cell::new(true),
            next_number: Cell::new(1),
            requests: RefCell::new(HashMap::new()),
            find_calls: RefCell::new(Vec::new()),
            create_calls: RefCell::new(Vec::new()),
            error_on_create: RefCell::new(None),
        }
    }

    pub fn unauthenticated(self) -> Self {
        self.authenticated.set(false);
        self
    }

    /// Behave as if the `gh` executable were missing
    pub fn not_installed(self) -> Self {
        self.installed.set(false);
        self
    }

    /// Register an existing pull request for `branch`, returning its URL.
    pub fn with_request(&self, branch: &str, state: ReviewState) -> String {
        let number = self.next_number.get();
        self.next_number.set(number + 1);
        let url = format!("{}/pull/{}", REPO_URL, number);
        self.requests.borrow_mut().insert(
            branch.to_string(),
            PullRequestInfo {
                number,
                title: format!("existing {}", number),
                head_ref_name: branch.to_string(),
                url: url.clone(),
                state,
            },
        );
        url
    }

    /// Make `create_request` return an error
    pub fn fail_create(&self, msg: &str) {
        *self.error_on_create.borrow_mut() = Some(msg.to_string());
    }

    // === Call verification methods ===

    pub fn find_calls(&self) -> Vec<String> {
        self.find_calls.borrow().clone()
    }

    pub fn created(&self) -> Vec<PullRequestDraft> {
        self.create_calls.borrow().clone()
    }
}

impl Default for MockReviewHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewHost for MockReviewHost {
    fn is_authenticated(&self) -> Result<bool> {
        if !self.installed.get() {
            return Err(ShiprError::MissingPrerequisite(Prerequisite::HostCli));
        }
        Ok(self.authenticated.get())
    }

    fn find_request(&self, branch: &str) -> Result<Option<PullRequestInfo>> {
        self.find_calls.borrow_mut().push(branch.to_string());
        Ok(self.requests.borrow().get(branch).cloned())
    }

    fn create_request(&self, draft: &PullRequestDraft) -> Result<String> {
        self.create_calls.borrow_mut().push(draft.clone());
        if let Some(msg) = self.error_on_create.borrow().clone() {
            return Err(ShiprError::GhError(msg));
        }
        Ok(self.with_request(&draft.head, ReviewState::Open))
    }
}
