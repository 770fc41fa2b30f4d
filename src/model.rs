// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the domain records (commits, merged pull requests, closed issues) and the unified Action timeline entry
// role: model/types
// outputs: Plain structs built by the record mappers and consumed by reconcile/render
// invariants: ActionContent is a closed enum; Action.date is the only sort/filter key
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;

use chrono::{DateTime, Utc};

/// One commit from the branch history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
  /// Full object id (used for pull request membership tests)
  pub oid: String,
  pub short_oid: String,
  pub message: String,
  pub authored_at: DateTime<Utc>,
  pub changed_files: u64,
  pub additions: u64,
  pub deletions: u64,
  /// The API reported at least one associated pull request.
  pub has_pull_request: bool,
}

/// Issue closed by a merged pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedIssue {
  pub number: u64,
  pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedPullRequest {
  pub number: u64,
  pub title: String,
  pub merged_at: DateTime<Utc>,
  /// `commits.totalCount` as reported by the API.
  pub commit_count: u64,
  pub changed_files: u64,
  pub additions: u64,
  pub deletions: u64,
  /// In API order.
  pub closed_issues: Vec<ClosedIssue>,
  pub commit_oids: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionContent {
  Commit(Commit),
  PullRequest(MergedPullRequest),
}

/// A timeline entry: either a direct commit or a merged pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
  pub date: DateTime<Utc>,
  pub content: ActionContent,
}

impl From<Commit> for Action {
  fn from(commit: Commit) -> Self {
    Action {
      date: commit.authored_at,
      content: ActionContent::Commit(commit),
    }
  }
}

impl From<MergedPullRequest> for Action {
  fn from(pr: MergedPullRequest) -> Self {
    Action {
      date: pr.merged_at,
      content: ActionContent::PullRequest(pr),
    }
  }
}


#[cfg(test)]
mod tests {
  use super::fixtures::*;
  use super::*;

  #[test]
  fn action_date_follows_content_kind() {
    let c = commit("def456", "fix typo", at(2022, 5, 11, 8, 0, 0));
    let pr = pull_request(7, "Add feature", at(2022, 5, 10, 12, 0, 0), &["abc123"]);

    let a: Action = c.clone().into();
    let b: Action = pr.clone().into();

    assert_eq!(a.date, c.authored_at);
    assert_eq!(b.date, pr.merged_at);
    assert!(matches!(a.content, ActionContent::Commit(_)));
    assert!(matches!(b.content, ActionContent::PullRequest(_)));
  }
}
