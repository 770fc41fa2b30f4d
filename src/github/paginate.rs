// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Cursor-based pagination driver shared by every GraphQL stream, plus typed page extractors per query shape
// role: github/pagination
// inputs: transport, a query builder (cursor -> document), a page extractor (body -> Page)
// outputs: All raw nodes of the stream, in page order
// invariants:
// - First call uses an empty cursor; each later call uses the previous endCursor
// - Nodes of a page are appended before continuation is checked
// - A missing structural key aborts the stream (PageShape)
// errors: Transport errors propagate untouched; shape problems become PageShape
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, SummaryError};
use crate::github::transport::GraphqlTransport;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
  pub has_next_page: bool,
  pub end_cursor: Option<String>,
}

/// One page of raw nodes.
#[derive(Debug, Clone)]
pub struct Page {
  pub info: PageInfo,
  pub nodes: Vec<serde_json::Value>,
}

/// Optional wall-clock limit for a whole run.
#[derive(Debug, Clone, Copy)]
pub struct RunDeadline {
  started: Instant,
  limit: Option<std::time::Duration>,
}

impl RunDeadline {
  pub fn new(limit: Option<std::time::Duration>) -> Self {
    Self {
      started: Instant::now(),
      limit,
    }
  }

  #[cfg(test)]
  pub fn unlimited() -> Self {
    Self::new(None)
  }

  fn check(&self, stream: &'static str) -> Result<()> {
    let elapsed = self.started.elapsed();

    match self.limit {
      Some(limit) if elapsed > limit => Err(SummaryError::DeadlineExceeded {
        stream,
        elapsed_secs: elapsed.as_secs(),
      }),
      _ => Ok(()),
    }
  }
}

/// Drive `build_query`/`extract_page` until the source reports no further page.
pub fn fetch_all<Q, E>(
  transport: &dyn GraphqlTransport,
  stream: &'static str,
  deadline: &RunDeadline,
  build_query: Q,
  extract_page: E,
) -> Result<Vec<serde_json::Value>>
where
  Q: Fn(&str) -> String,
  E: Fn(serde_json::Value) -> Result<Page>,
{
  let mut cursor = String::new();
  let mut nodes: Vec<serde_json::Value> = Vec::new();
  let mut page_index = 0usize;

  loop {
    deadline.check(stream)?;

    let body = transport.post_query(&build_query(&cursor))?;
    let page = extract_page(body)?;
    debug!(stream, page = page_index, nodes = page.nodes.len(), "fetched page");

    nodes.extend(page.nodes);
    page_index += 1;

    if !page.info.has_next_page {
      break;
    }

    cursor = match page.info.end_cursor {
      Some(c) if !c.is_empty() => c,
      _ => {
        return Err(SummaryError::PageShape {
          stream,
          detail: "hasNextPage is true but endCursor is missing".into(),
        })
      }
    };
  }

  Ok(nodes)
}

// --- Typed response envelopes ---

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope<T> {
  data: Option<T>,
  #[serde(default)]
  errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
  message: String,
}

fn decode<T: DeserializeOwned>(stream: &'static str, body: serde_json::Value) -> Result<T> {
  let envelope: GraphqlEnvelope<T> = serde_json::from_value(body).map_err(|e| SummaryError::PageShape {
    stream,
    detail: e.to_string(),
  })?;

  if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
    return Err(SummaryError::GraphQl {
      messages: errors.into_iter().map(|e| e.message).collect(),
    });
  }

  envelope.data.ok_or_else(|| SummaryError::PageShape {
    stream,
    detail: "response has no `data`".into(),
  })
}

fn missing(stream: &'static str, what: &str) -> SummaryError {
  SummaryError::PageShape {
    stream,
    detail: format!("`{what}` is null"),
  }
}

#[derive(Debug, Deserialize)]
struct HistoryData {
  repository: Option<HistoryRepository>,
}

#[derive(Debug, Deserialize)]
struct HistoryRepository {
  #[serde(rename = "ref")]
  git_ref: Option<HistoryRef>,
}

#[derive(Debug, Deserialize)]
struct HistoryRef {
  target: HistoryTarget,
}

#[derive(Debug, Deserialize)]
struct HistoryTarget {
  history: HistoryConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryConnection {
  page_info: PageInfo,
  edges: Vec<HistoryEdge>,
}

#[derive(Debug, Deserialize)]
struct HistoryEdge {
  node: serde_json::Value,
}

/// `data.repository.ref.target.history.{pageInfo, edges[].node}`
pub fn extract_history_page(body: serde_json::Value) -> Result<Page> {
  const STREAM: &str = "commit history";
  let data: HistoryData = decode(STREAM, body)?;

  let git_ref = data
    .repository
    .ok_or_else(|| missing(STREAM, "repository"))?
    .git_ref
    .ok_or_else(|| missing(STREAM, "repository.ref (unknown branch?)"))?;
  let history = git_ref.target.history;

  Ok(Page {
    info: history.page_info,
    nodes: history.edges.into_iter().map(|e| e.node).collect(),
  })
}

#[derive(Debug, Deserialize)]
struct PullRequestsData {
  repository: Option<PullRequestsRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestsRepository {
  pull_requests: NodeConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeConnection {
  page_info: PageInfo,
  nodes: Vec<serde_json::Value>,
}

/// `data.repository.pullRequests.{pageInfo, nodes[]}`
pub fn extract_pull_request_page(body: serde_json::Value) -> Result<Page> {
  const STREAM: &str = "pull requests";
  let data: PullRequestsData = decode(STREAM, body)?;
  let conn = data.repository.ok_or_else(|| missing(STREAM, "repository"))?.pull_requests;

  Ok(Page {
    info: conn.page_info,
    nodes: conn.nodes,
  })
}

#[derive(Debug, Deserialize)]
struct PullCommitsData {
  repository: Option<PullCommitsRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullCommitsRepository {
  pull_request: Option<PullCommitsNode>,
}

#[derive(Debug, Deserialize)]
struct PullCommitsNode {
  commits: NodeConnection,
}

/// `data.repository.pullRequest.commits.{pageInfo, nodes[]}`
pub fn extract_pull_commit_page(body: serde_json::Value) -> Result<Page> {
  const STREAM: &str = "pull request commits";
  let data: PullCommitsData = decode(STREAM, body)?;
  let conn = data
    .repository
    .ok_or_else(|| missing(STREAM, "repository"))?
    .pull_request
    .ok_or_else(|| missing(STREAM, "repository.pullRequest"))?
    .commits;

  Ok(Page {
    info: conn.page_info,
    nodes: conn.nodes,
  })
}


#[cfg(test)]
mod tests {
  use super::testkit::*;
  use super::*;
  use proptest::prelude::*;
  use serde_json::json;

  fn run_history(t: &ScriptedTransport) -> Result<Vec<serde_json::Value>> {
    fetch_all(t, "commit history", &RunDeadline::unlimited(), |c| format!("cursor={c}"), extract_history_page)
  }

  #[test]
  fn single_page_issues_one_call() {
    let t = ScriptedTransport::new(vec![history_page(vec![json!({"n": 1}), json!({"n": 2})], None)]);
    let nodes = run_history(&t).unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(t.calls(), 1);
    assert_eq!(t.queries.lock().unwrap()[0], "cursor=");
  }

  #[test]
  fn cursors_are_threaded_through_calls() {
    let t = ScriptedTransport::new(vec![
      history_page(vec![json!({"n": 1})], Some("c1")),
      history_page(vec![json!({"n": 2})], Some("c2")),
      history_page(vec![], None),
    ]);
    let nodes = run_history(&t).unwrap();
    assert_eq!(nodes, vec![json!({"n": 1}), json!({"n": 2})]);
    assert_eq!(*t.queries.lock().unwrap(), vec!["cursor=", "cursor=c1", "cursor=c2"]);
  }

  #[test]
  fn missing_page_info_is_page_shape_error() {
    let body = json!({ "data": { "repository": { "ref": { "target": { "history": { "edges": [] }}}}}});
    let t = ScriptedTransport::new(vec![body]);
    let err = run_history(&t).unwrap_err();
    assert!(matches!(err, SummaryError::PageShape { stream: "commit history", .. }), "{err}");
  }

  #[test]
  fn unknown_branch_is_page_shape_error() {
    let body = json!({ "data": { "repository": { "ref": null }}});
    let t = ScriptedTransport::new(vec![body]);
    let err = run_history(&t).unwrap_err();
    assert!(err.to_string().contains("unknown branch"), "{err}");
  }

  #[test]
  fn next_page_without_cursor_is_page_shape_error() {
    let mut body = history_page(vec![json!({})], None);
    *body.pointer_mut("/data/repository/ref/target/history/pageInfo").unwrap() =
      json!({ "hasNextPage": true, "endCursor": null });
    let t = ScriptedTransport::new(vec![body]);
    let err = run_history(&t).unwrap_err();
    assert!(err.to_string().contains("endCursor"), "{err}");
    assert_eq!(t.calls(), 1);
  }

  #[test]
  fn graphql_errors_abort() {
    let body = json!({ "data": null, "errors": [{ "message": "Could not resolve to a Repository" }]});
    let t = ScriptedTransport::new(vec![body]);
    let err = run_history(&t).unwrap_err();
    assert!(matches!(err, SummaryError::GraphQl { .. }));
  }

  #[test]
  fn transport_failure_mid_stream_propagates() {
    let t = ScriptedTransport::with_results(vec![
      Ok(history_page(vec![json!({})], Some("c1"))),
      Err(SummaryError::Transport {
        endpoint: "scripted".into(),
        status: 502,
        body: "bad gateway".into(),
      }),
    ]);
    let err = run_history(&t).unwrap_err();
    assert!(matches!(err, SummaryError::Transport { status: 502, .. }));
  }

  #[test]
  fn expired_deadline_stops_before_first_call() {
    let deadline = RunDeadline::new(Some(std::time::Duration::ZERO));
    std::thread::sleep(std::time::Duration::from_millis(5));
    let t = ScriptedTransport::new(vec![history_page(vec![], None)]);
    let err = fetch_all(&t, "commit history", &deadline, |c| c.to_string(), extract_history_page).unwrap_err();
    assert!(matches!(err, SummaryError::DeadlineExceeded { .. }));
    assert_eq!(t.calls(), 0);
  }

  #[test]
  fn pull_request_and_commit_pages_extract_nodes() {
    let pr = extract_pull_request_page(pull_request_page(vec![json!({"number": 1})], Some("x"))).unwrap();
    assert!(pr.info.has_next_page);
    assert_eq!(pr.info.end_cursor.as_deref(), Some("x"));
    assert_eq!(pr.nodes.len(), 1);

    let commits = extract_pull_commit_page(pull_commit_page(&["a", "b"], None)).unwrap();
    assert!(!commits.info.has_next_page);
    assert_eq!(commits.nodes.len(), 2);
  }

  proptest! {
    #[test]
    fn pagination_is_complete(page_sizes in proptest::collection::vec(0usize..5, 1..8)) {
      let n = page_sizes.len();
      let bodies: Vec<serde_json::Value> = page_sizes
        .iter()
        .enumerate()
        .map(|(i, size)| {
          let nodes = (0..*size).map(|k| json!({ "page": i, "k": k })).collect();
          let next = if i + 1 < n { Some(format!("c{i}")) } else { None };
          history_page(nodes, next.as_deref())
        })
        .collect();
      let t = ScriptedTransport::new(bodies);
      let nodes = run_history(&t).unwrap();

      prop_assert_eq!(t.calls(), n);
      prop_assert_eq!(nodes.len(), page_sizes.iter().sum::<usize>());
    }
  }
}
