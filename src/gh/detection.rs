//! PR detection for branches.

use crate::error::Result;

use super::types::{PullRequestInfo, ReviewState};

/// Parse `gh pr list --json number,title,headRefName,url,state` output.
pub(crate) fn parse_pr_list(json: &str) -> Result<Vec<PullRequestInfo>> {
    let trimmed = json.trim();
    if trimmed.is_empty() {
        return Ok(vec![]);
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// Pick the request that best describes a branch when several share its head.
///
/// An open request wins over a merged one, which wins over a closed one;
/// within a state the highest number (the newest) wins.
pub fn most_relevant_request(prs: Vec<PullRequestInfo>) -> Option<PullRequestInfo> {
    prs.into_iter().max_by_key(|pr| (state_rank(pr.state), pr.number))
}

fn state_rank(state: ReviewState) -> u8 {
    match state {
        ReviewState::Open => 3,
        ReviewState::Merged => 2,
        ReviewState::Closed => 1,
        ReviewState::None => 0,
    }
}
