//! In-memory git backend.
//!
//! Histories are linear lists of commit ids. `origin/<b>` refs only move on
//! `fetch` or `push`, while the server side (`remote`) can be changed by a
//! test behind the local clone's back.

use shipr::error::{Result, ShiprError};
use shipr::git::{CommitInfo, GitBackend, InProgressOperation, PushMode};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Repo {
    default_branch: String,
    has_origin: bool,
    operation: Option<InProgressOperation>,
    current: Option<String>,
    local: HashMap<String, Vec<String>>,
    tracking: HashMap<String, Vec<String>>,
    remote: HashMap<String, Vec<String>>,
    dirty: bool,
    staged: bool,
    /// Dirty edits that stage to nothing, e.g. only ignored files changed
    dirty_stages_empty: bool,
    messages: HashMap<String, String>,
}

pub struct FakeGit {
    repo: RefCell<Repo>,
    next_id: Cell<u32>,
    calls: RefCell<Vec<String>>,
    failures: RefCell<HashMap<String, String>>,
}

impl FakeGit {
    /// A clone of `origin` with `default_branch` checked out, both at one commit.
    pub fn new(default_branch: &str) -> Self {
        let root = vec!["c0".to_string()];
        let mut repo = Repo {
            default_branch: default_branch.to_string(),
            has_origin: true,
            current: Some(default_branch.to_string()),
            ..Default::default()
        };
        repo.local.insert(default_branch.to_string(), root.clone());
        repo.tracking.insert(default_branch.to_string(), root.clone());
        repo.remote.insert(default_branch.to_string(), root);
        repo.messages.insert("c0".to_string(), "initial".to_string());

        Self {
            repo: RefCell::new(repo),
            next_id: Cell::new(1),
            calls: RefCell::new(Vec::new()),
            failures: RefCell::new(HashMap::new()),
        }
    }

    // === Setup ===

    pub fn with_edits(self) -> Self {
        self.repo.borrow_mut().dirty = true;
        self
    }

    pub fn without_origin(self) -> Self {
        self.repo.borrow_mut().has_origin = false;
        self
    }

    pub fn with_operation(self, op: InProgressOperation) -> Self {
        self.repo.borrow_mut().operation = Some(op);
        self
    }

    pub fn detached(self) -> Self {
        self.repo.borrow_mut().current = None;
        self
    }

    /// Edits exist but staging them produces no diff.
    pub fn with_unstageable_edits(self) -> Self {
        {
            let mut repo = self.repo.borrow_mut();
            repo.dirty = true;
            repo.dirty_stages_empty = true;
        }
        self
    }

    /// Create `name` from the current branch and check it out, pushed or not.
    pub fn on_feature_branch(self, name: &str, local_commits: usize, pushed: bool) -> Self {
        let start = self.history("HEAD");
        let mut history = start;
        for _ in 0..local_commits {
            history.push(self.fresh_commit("work"));
        }
        {
            let mut repo = self.repo.borrow_mut();
            repo.local.insert(name.to_string(), history.clone());
            if pushed {
                repo.tracking.insert(name.to_string(), history.clone());
                repo.remote.insert(name.to_string(), history);
            }
            repo.current = Some(name.to_string());
        }
        self
    }

    /// Commits on the local copy of `branch` that origin does not have.
    pub fn commit_locally(&self, branch: &str, subject: &str) {
        let id = self.fresh_commit(subject);
        self.repo
            .borrow_mut()
            .local
            .entry(branch.to_string())
            .or_default()
            .push(id);
    }

    /// Someone else pushes to `branch` on the server.
    pub fn push_from_elsewhere(&self, branch: &str) {
        let id = self.fresh_commit("elsewhere");
        self.repo
            .borrow_mut()
            .remote
            .entry(branch.to_string())
            .or_default()
            .push(id);
    }

    pub fn add_local_branch(&self, name: &str) {
        let history = self.history("HEAD");
        self.repo.borrow_mut().local.insert(name.to_string(), history);
    }

    pub fn add_remote_branch(&self, name: &str) {
        let history = self.history("HEAD");
        self.repo.borrow_mut().remote.insert(name.to_string(), history);
    }

    /// Make the named operation (`fetch`, `push`, `rebase`, ...) fail.
    pub fn fail_on(&self, op: &str, message: &str) {
        self.failures
            .borrow_mut()
            .insert(op.to_string(), message.to_string());
    }

    pub fn clear_failure(&self, op: &str) {
        self.failures.borrow_mut().remove(op);
    }

    // === Inspection ===

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Mutating calls only: everything except reads and fetches.
    pub fn mutations(&self) -> Vec<String> {
        const MUTATING: [&str; 9] = [
            "create_branch",
            "checkout",
            "delete_branch",
            "reset_soft",
            "merge_ff_only",
            "stage_all",
            "commit",
            "rebase",
            "push",
        ];
        self.calls()
            .into_iter()
            .filter(|call| {
                let op = call.split_whitespace().next().unwrap_or_default();
                MUTATING.contains(&op)
            })
            .collect()
    }

    pub fn called(&self, op: &str) -> bool {
        self.calls()
            .iter()
            .any(|call| call.split_whitespace().next() == Some(op))
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn current(&self) -> Option<String> {
        self.repo.borrow().current.clone()
    }

    pub fn branch_exists(&self, name: &str) -> bool {
        self.repo.borrow().local.contains_key(name)
    }

    pub fn remote_history(&self, branch: &str) -> Option<Vec<String>> {
        self.repo.borrow().remote.get(branch).cloned()
    }

    pub fn local_history(&self, branch: &str) -> Option<Vec<String>> {
        self.repo.borrow().local.get(branch).cloned()
    }

    pub fn commit_messages(&self, branch: &str) -> Vec<String> {
        let repo = self.repo.borrow();
        repo.local
            .get(branch)
            .map(|history| {
                history
                    .iter()
                    .map(|id| repo.messages.get(id).cloned().unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_staged(&self) -> bool {
        self.repo.borrow().staged
    }

    pub fn is_dirty(&self) -> bool {
        let repo = self.repo.borrow();
        repo.dirty || repo.staged
    }

    // === Internals ===

    fn record(&self, call: String) -> Result<()> {
        let op = call.split_whitespace().next().unwrap_or_default().to_string();
        self.calls.borrow_mut().push(call);
        let failure = self.failures.borrow().get(&op).cloned();
        match failure {
            Some(message) => Err(ShiprError::GitError(message)),
            None => Ok(()),
        }
    }

    fn fresh_commit(&self, subject: &str) -> String {
        let id = format!("c{}", self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.repo
            .borrow_mut()
            .messages
            .insert(id.clone(), subject.to_string());
        id
    }

    fn history(&self, rev: &str) -> Vec<String> {
        self.resolve(rev).unwrap_or_default()
    }

    fn resolve(&self, rev: &str) -> Option<Vec<String>> {
        let repo = self.repo.borrow();
        if rev == "HEAD" {
            let current = repo.current.as_ref()?;
            return repo.local.get(current).cloned();
        }
        match rev.strip_prefix("origin/") {
            Some(branch) => repo.tracking.get(branch).cloned(),
            None => repo.local.get(rev).cloned(),
        }
    }

    fn resolve_or_err(&self, rev: &str) -> Result<Vec<String>> {
        self.resolve(rev)
            .ok_or_else(|| ShiprError::GitError(format!("unknown revision '{}'", rev)))
    }

    fn current_or_err(&self) -> Result<String> {
        self.repo
            .borrow()
            .current
            .clone()
            .ok_or_else(|| ShiprError::GitError("HEAD is detached".to_string()))
    }

    fn set_current_history(&self, history: Vec<String>) -> Result<()> {
        let current = self.current_or_err()?;
        self.repo.borrow_mut().local.insert(current, history);
        Ok(())
    }
}

fn is_prefix(prefix: &[String], of: &[String]) -> bool {
    prefix.len() <= of.len() && prefix.iter().zip(of).all(|(a, b)| a == b)
}

fn difference<'a>(from: &[String], to: &'a [String]) -> Vec<&'a String> {
    to.iter().filter(|id| !from.contains(id)).collect()
}

impl GitBackend for FakeGit {
    fn current_branch(&self) -> Result<Option<String>> {
        self.record("current_branch".to_string())?;
        Ok(self.repo.borrow().current.clone())
    }

    fn default_branch(&self) -> Result<String> {
        self.record("default_branch".to_string())?;
        Ok(self.repo.borrow().default_branch.clone())
    }

    fn has_origin(&self) -> Result<bool> {
        self.record("has_origin".to_string())?;
        Ok(self.repo.borrow().has_origin)
    }

    fn operation_in_progress(&self) -> Result<Option<InProgressOperation>> {
        self.record("operation_in_progress".to_string())?;
        Ok(self.repo.borrow().operation)
    }

    fn is_clean(&self) -> Result<bool> {
        self.record("is_clean".to_string())?;
        Ok(!self.is_dirty())
    }

    fn head_commit(&self) -> Result<String> {
        self.record("head_commit".to_string())?;
        Ok(self.history("HEAD").last().cloned().unwrap_or_default())
    }

    fn fetch(&self, branch: &str) -> Result<()> {
        self.record(format!("fetch {}", branch))?;
        let mut repo = self.repo.borrow_mut();
        let history = repo.remote.get(branch).cloned().ok_or_else(|| {
            ShiprError::GitError(format!("couldn't find remote ref {}", branch))
        })?;
        repo.tracking.insert(branch.to_string(), history);
        Ok(())
    }

    fn remote_branch_exists(&self, branch: &str) -> Result<bool> {
        self.record(format!("remote_branch_exists {}", branch))?;
        Ok(self.repo.borrow().remote.contains_key(branch))
    }

    fn local_branch_exists(&self, branch: &str) -> Result<bool> {
        self.record(format!("local_branch_exists {}", branch))?;
        Ok(self.repo.borrow().local.contains_key(branch))
    }

    fn count_commits(&self, from: &str, to: &str) -> Result<u32> {
        self.record(format!("count_commits {} {}", from, to))?;
        let from = self.resolve_or_err(from)?;
        let to = self.resolve_or_err(to)?;
        Ok(difference(&from, &to).len() as u32)
    }

    fn list_commits(&self, from: &str, to: &str) -> Result<Vec<CommitInfo>> {
        self.record(format!("list_commits {} {}", from, to))?;
        let from = self.resolve_or_err(from)?;
        let to = self.resolve_or_err(to)?;
        let repo = self.repo.borrow();
        Ok(difference(&from, &to)
            .into_iter()
            .rev()
            .map(|id| CommitInfo {
                short_hash: id.clone(),
                subject: repo.messages.get(id).cloned().unwrap_or_default(),
            })
            .collect())
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        self.record(format!("is_ancestor {} {}", ancestor, descendant))?;
        let ancestor = self.resolve_or_err(ancestor)?;
        let descendant = self.resolve_or_err(descendant)?;
        Ok(is_prefix(&ancestor, &descendant))
    }

    fn is_valid_branch_name(&self, name: &str) -> Result<bool> {
        self.record(format!("is_valid_branch_name {}", name))?;
        Ok(!name.starts_with('-')
            && !name.contains("..")
            && !name.ends_with('/')
            && !name.ends_with(".lock"))
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        self.record(format!("create_branch {}", name))?;
        let history = self.history("HEAD");
        let mut repo = self.repo.borrow_mut();
        repo.local.insert(name.to_string(), history);
        repo.current = Some(name.to_string());
        Ok(())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.record(format!("checkout {}", branch))?;
        let mut repo = self.repo.borrow_mut();
        if !repo.local.contains_key(branch) {
            return Err(ShiprError::GitError(format!("no branch {}", branch)));
        }
        repo.current = Some(branch.to_string());
        Ok(())
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        self.record(format!("delete_branch {}", branch))?;
        let mut repo = self.repo.borrow_mut();
        if repo.current.as_deref() == Some(branch) {
            return Err(ShiprError::GitError(format!(
                "cannot delete checked-out branch {}",
                branch
            )));
        }
        repo.local.remove(branch);
        Ok(())
    }

    fn reset_soft(&self, rev: &str) -> Result<()> {
        self.record(format!("reset_soft {}", rev))?;
        let head = self.history("HEAD");
        let cut = head
            .iter()
            .position(|id| id == rev)
            .ok_or_else(|| ShiprError::GitError(format!("unknown revision '{}'", rev)))?;
        self.set_current_history(head[..=cut].to_vec())?;
        let mut repo = self.repo.borrow_mut();
        repo.staged = true;
        repo.dirty = true;
        Ok(())
    }

    fn merge_ff_only(&self, rev: &str) -> Result<()> {
        self.record(format!("merge_ff_only {}", rev))?;
        let head = self.history("HEAD");
        let target = self.resolve_or_err(rev)?;
        if !is_prefix(&head, &target) {
            return Err(ShiprError::GitError("Not possible to fast-forward".to_string()));
        }
        self.set_current_history(target)
    }

    fn stage_all(&self) -> Result<()> {
        self.record("stage_all".to_string())?;
        let mut repo = self.repo.borrow_mut();
        if repo.dirty && !repo.dirty_stages_empty {
            repo.staged = true;
        }
        Ok(())
    }

    fn has_staged_changes(&self) -> Result<bool> {
        self.record("has_staged_changes".to_string())?;
        Ok(self.repo.borrow().staged)
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.record(format!("commit {}", message))?;
        if !self.repo.borrow().staged {
            return Err(ShiprError::GitError("nothing to commit".to_string()));
        }
        let id = self.fresh_commit(message);
        let mut history = self.history("HEAD");
        history.push(id);
        self.set_current_history(history)?;
        let mut repo = self.repo.borrow_mut();
        repo.staged = false;
        repo.dirty = false;
        Ok(())
    }

    fn rebase(&self, onto: &str) -> Result<()> {
        self.record(format!("rebase {}", onto))?;
        let head = self.history("HEAD");
        let target = self.resolve_or_err(onto)?;
        let mut rebased = target.clone();
        for id in difference(&target, &head) {
            let subject = self
                .repo
                .borrow()
                .messages
                .get(id)
                .cloned()
                .unwrap_or_default();
            rebased.push(self.fresh_commit(&subject));
        }
        self.set_current_history(rebased)
    }

    fn push(&self, branch: &str, mode: PushMode) -> Result<()> {
        self.record(format!("push {} {}", branch, mode))?;
        let local = self.resolve_or_err(branch)?;
        let mut repo = self.repo.borrow_mut();
        let server = repo.remote.get(branch).cloned();

        match (mode, &server) {
            (PushMode::Tracking, Some(server)) if !is_prefix(server, &local) => {
                return Err(ShiprError::GitError(
                    "! [rejected] (non-fast-forward)".to_string(),
                ));
            }
            (PushMode::ForceWithLease, Some(server))
                if repo.tracking.get(branch) != Some(server) =>
            {
                return Err(ShiprError::GitError("! [rejected] (stale info)".to_string()));
            }
            _ => {}
        }

        repo.remote.insert(branch.to_string(), local.clone());
        repo.tracking.insert(branch.to_string(), local);
        Ok(())
    }
}
