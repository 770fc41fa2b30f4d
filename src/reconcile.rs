// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Merge fetched commits and merged pull requests into one action timeline without double reporting
// role: reconcile
// inputs: Fully materialized commit and pull request sequences
// outputs: Vec<Action> (commits first, then pull requests; ordering happens in window selection)
// invariants:
// - A commit whose oid belongs to any pull request never becomes a commit action
// - A commit whose message starts with "Merge pull request #" never becomes a commit action
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;

use tracing::debug;

use crate::model::{Action, Commit, MergedPullRequest};

pub const MERGE_COMMIT_PREFIX: &str = "Merge pull request #";

/// Heuristic for the synthetic commit GitHub creates when merging a pull request.
pub fn is_merge_commit_message(message: &str) -> bool {
  message.starts_with(MERGE_COMMIT_PREFIX)
}

pub fn reconcile(commits: Vec<Commit>, pull_requests: Vec<MergedPullRequest>) -> Vec<Action> {
  let total = commits.len();
  let kept: Vec<Commit> = {
    let in_pull_request: HashSet<&str> = pull_requests
      .iter()
      .flat_map(|pr| pr.commit_oids.iter().map(String::as_str))
      .collect();

    commits
      .into_iter()
      .filter(|c| !in_pull_request.contains(c.oid.as_str()) && !is_merge_commit_message(&c.message))
      .collect()
  };
  debug!(total, kept = kept.len(), pull_requests = pull_requests.len(), "reconciled commits");

  kept
    .into_iter()
    .map(Action::from)
    .chain(pull_requests.into_iter().map(Action::from))
    .collect()
}
