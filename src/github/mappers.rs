// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Map one raw GraphQL node into a typed Commit or MergedPullRequest
// role: github/mapping
// inputs: serde_json::Value nodes produced by the paginator
// outputs: Commit (tolerant: RecordUnusable on any gap) and MergedPullRequest (strict: fatal on any gap)
// invariants: Pure functions; no I/O; closed issues keep API order
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::error::{RecordUnusable, Result, SummaryError};
use crate::ext::serde_json::JsonFetch;
use crate::github::paginate::PageInfo;
use crate::model::{ClosedIssue, Commit, MergedPullRequest};

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Map a commit-history node. Any missing or malformed field makes the record unusable.
pub fn commit_from_node(node: &serde_json::Value) -> std::result::Result<Commit, RecordUnusable> {
  fn field<T: DeserializeOwned>(node: &serde_json::Value, path: &'static str) -> std::result::Result<T, RecordUnusable> {
    node.fetch(path).to::<T>().ok_or(RecordUnusable { field: path })
  }

  let authored_raw: String = field(node, "authoredDate")?;
  let authored_at = parse_timestamp(&authored_raw).ok_or(RecordUnusable { field: "authoredDate" })?;
  let associated: u64 = field(node, "associatedPullRequests.totalCount")?;

  Ok(Commit {
    oid: field(node, "oid")?,
    short_oid: field(node, "abbreviatedOid")?,
    message: field(node, "message")?,
    authored_at,
    changed_files: field(node, "changedFiles")?,
    additions: field(node, "additions")?,
    deletions: field(node, "deletions")?,
    has_pull_request: associated > 0,
  })
}

/// A merged pull request plus where its embedded commit page left off.
#[derive(Debug, Clone)]
pub struct MappedPullRequest {
  pub pull_request: MergedPullRequest,
  /// Pagination state of the embedded `commits` connection.
  pub commits_page: PageInfo,
}

fn required<T: DeserializeOwned>(node: &serde_json::Value, path: &'static str) -> Result<T> {
  node.fetch(path).to::<T>().ok_or_else(|| SummaryError::MalformedPullRequest {
    field: path,
    detail: match node.fetch("number").to::<u64>() {
      Some(n) => format!("missing or malformed in pull request #{n}"),
      None => "missing or malformed".into(),
    },
  })
}

/// Extract `commit.oid` from pull-request commit nodes.
pub fn commit_oids_from_nodes(nodes: &[serde_json::Value]) -> Result<Vec<String>> {
  nodes.iter().map(|n| required::<String>(n, "commit.oid")).collect()
}

/// Map a merged pull request node. Any missing field is fatal for the run.
pub fn pull_request_from_node(node: &serde_json::Value) -> Result<MappedPullRequest> {
  let merged_raw: String = required(node, "mergedAt")?;
  let merged_at = parse_timestamp(&merged_raw).ok_or_else(|| SummaryError::MalformedPullRequest {
    field: "mergedAt",
    detail: format!("not an RFC 3339 timestamp: {merged_raw}"),
  })?;

  let commit_nodes = node.fetch("commits.nodes").items().ok_or_else(|| SummaryError::MalformedPullRequest {
    field: "commits.nodes",
    detail: "missing or not an array".into(),
  })?;
  let commit_oids: HashSet<String> = commit_oids_from_nodes(commit_nodes)?.into_iter().collect();

  let issue_nodes = node
    .fetch("closingIssuesReferences.nodes")
    .items()
    .ok_or_else(|| SummaryError::MalformedPullRequest {
      field: "closingIssuesReferences.nodes",
      detail: "missing or not an array".into(),
    })?;
  let closed_issues = issue_nodes
    .iter()
    .map(|issue| -> Result<ClosedIssue> {
      Ok(ClosedIssue {
        number: required(issue, "number")?,
        title: required(issue, "title")?,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  let pull_request = MergedPullRequest {
    number: required(node, "number")?,
    title: required(node, "title")?,
    merged_at,
    commit_count: required(node, "commits.totalCount")?,
    changed_files: required(node, "changedFiles")?,
    additions: required(node, "additions")?,
    deletions: required(node, "deletions")?,
    closed_issues,
    commit_oids,
  };

  Ok(MappedPullRequest {
    pull_request,
    commits_page: required(node, "commits.pageInfo")?,
  })
}
