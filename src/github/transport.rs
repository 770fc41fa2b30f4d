// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Authenticated POST of GraphQL query documents to a single endpoint (HTTP or env-backed fixtures)
// role: github/transport
// inputs: fully substituted query documents; bearer token; env GAS_TEST_* fixtures for offline runs
// outputs: Parsed JSON response bodies
// side_effects: Network calls to the GraphQL endpoint; spawns `gh auth token` during token discovery
// invariants:
// - One call per query, no retries; a non-success status is always a Transport error
// - Env fixtures are used only when at least one GAS_TEST_* variable is set
// errors: SummaryError::{Transport, Network, InvalidJson}
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::bail;
use tracing::debug;

use crate::error::{Result, SummaryError};
use crate::util::clip_text;

pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

const USER_AGENT: &str = concat!("github-activity-summary/", env!("CARGO_PKG_VERSION"));
const BODY_EXCERPT_CHARS: usize = 2000;

pub const ENV_HISTORY_PAGES: &str = "GAS_TEST_HISTORY_PAGES";
pub const ENV_PULL_REQUEST_PAGES: &str = "GAS_TEST_PULL_REQUEST_PAGES";
pub const ENV_PULL_COMMIT_PAGES: &str = "GAS_TEST_PULL_COMMIT_PAGES";

/// Discover a GitHub token: env vars first, then `gh auth token` if available.
pub fn discover_token() -> Option<String> {
  for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
    if let Ok(t) = std::env::var(var) {
      if !t.trim().is_empty() {
        return Some(t);
      }
    }
  }

  if let Ok(output) = std::process::Command::new("gh").args(["auth", "token"]).output() {
    if output.status.success() {
      let t = String::from_utf8_lossy(&output.stdout).trim().to_string();

      if !t.is_empty() {
        return Some(t);
      }
    }
  }

  None
}

// --- Trait seam for the GraphQL endpoint ---
pub trait GraphqlTransport: Sync {
  fn endpoint(&self) -> &str;

  /// POST `{ "query": <query> }` and return the parsed success body.
  fn post_query(&self, query: &str) -> Result<serde_json::Value>;
}

pub struct HttpTransport {
  agent: ureq::Agent,
  endpoint: String,
  token: String,
}

impl HttpTransport {
  pub fn new(endpoint: String, token: String, timeout: Duration) -> Self {
    let agent: ureq::Agent = ureq::Agent::config_builder()
      .http_status_as_error(false)
      .timeout_global(Some(timeout))
      .build()
      .into();

    Self { agent, endpoint, token }
  }

  fn network_error(&self, err: impl std::fmt::Display) -> SummaryError {
    SummaryError::Network {
      endpoint: self.endpoint.clone(),
      message: err.to_string(),
    }
  }
}

impl GraphqlTransport for HttpTransport {
  fn endpoint(&self) -> &str {
    &self.endpoint
  }

  fn post_query(&self, query: &str) -> Result<serde_json::Value> {
    let envelope = serde_json::json!({ "query": query });

    let mut resp = self
      .agent
      .post(&self.endpoint)
      .header("Accept", "application/json")
      .header("User-Agent", USER_AGENT)
      .header("Authorization", format!("Bearer {}", self.token))
      .send_json(&envelope)
      .map_err(|e| self.network_error(e))?;

    let status = resp.status().as_u16();
    let text = resp.body_mut().read_to_string().map_err(|e| self.network_error(e))?;
    debug!(endpoint = %self.endpoint, status, bytes = text.len(), "graphql response");

    if !(200..300).contains(&status) {
      return Err(SummaryError::Transport {
        endpoint: self.endpoint.clone(),
        status,
        body: clip_text(&text, BODY_EXCERPT_CHARS),
      });
    }

    serde_json::from_str(&text).map_err(|e| SummaryError::InvalidJson {
      endpoint: self.endpoint.clone(),
      message: e.to_string(),
    })
  }
}

/// Serves canned response bodies from `GAS_TEST_*` variables, one per call, in order.
pub struct EnvTransport {
  history: FixtureStream,
  pull_requests: FixtureStream,
  pull_commits: FixtureStream,
}

struct FixtureStream {
  var: &'static str,
  pages: Vec<serde_json::Value>,
  next: AtomicUsize,
}

impl FixtureStream {
  fn from_env(var: &'static str) -> Result<Self> {
    let pages = match std::env::var(var) {
      Ok(raw) => serde_json::from_str::<Vec<serde_json::Value>>(&raw).map_err(|e| SummaryError::InvalidJson {
        endpoint: format!("env:{var}"),
        message: e.to_string(),
      })?,
      Err(_) => Vec::new(),
    };

    Ok(Self {
      var,
      pages,
      next: AtomicUsize::new(0),
    })
  }

  fn serve(&self) -> Result<serde_json::Value> {
    let idx = self.next.fetch_add(1, Ordering::SeqCst);

    self.pages.get(idx).cloned().ok_or_else(|| SummaryError::Transport {
      endpoint: format!("env:{}", self.var),
      status: 404,
      body: format!("no fixture page at index {idx}"),
    })
  }
}

impl EnvTransport {
  pub fn from_env() -> Result<Self> {
    Ok(Self {
      history: FixtureStream::from_env(ENV_HISTORY_PAGES)?,
      pull_requests: FixtureStream::from_env(ENV_PULL_REQUEST_PAGES)?,
      pull_commits: FixtureStream::from_env(ENV_PULL_COMMIT_PAGES)?,
    })
  }
}

impl GraphqlTransport for EnvTransport {
  fn endpoint(&self) -> &str {
    "env"
  }

  fn post_query(&self, query: &str) -> Result<serde_json::Value> {
    if query.contains("pullRequest(number:") {
      self.pull_commits.serve()
    } else if query.contains("pullRequests(") {
      self.pull_requests.serve()
    } else if query.contains("history(") {
      self.history.serve()
    } else {
      Err(SummaryError::Transport {
        endpoint: "env".into(),
        status: 400,
        body: "query matches no fixture stream".into(),
      })
    }
  }
}

pub fn env_wants_mock() -> bool {
  [ENV_HISTORY_PAGES, ENV_PULL_REQUEST_PAGES, ENV_PULL_COMMIT_PAGES]
    .iter()
    .any(|k| std::env::var(k).is_ok())
}

pub fn build_transport(
  token: Option<String>,
  endpoint: &str,
  timeout: Duration,
) -> anyhow::Result<Box<dyn GraphqlTransport>> {
  if env_wants_mock() {
    return Ok(Box::new(EnvTransport::from_env()?));
  }

  match token {
    Some(t) => Ok(Box::new(HttpTransport::new(endpoint.to_string(), t, timeout))),
    None => bail!("Missing token. Pass --token, set GITHUB_TOKEN, or run: gh auth login"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn env_transport_routes_queries_and_serves_pages_in_order() {
    let _env = test_support::with_env(&[
      (ENV_HISTORY_PAGES, r#"[{"page": 1}, {"page": 2}]"#),
      (ENV_PULL_REQUEST_PAGES, r#"[{"pr": true}]"#),
    ]);
    assert!(env_wants_mock());

    let t = EnvTransport::from_env().unwrap();
    assert_eq!(t.post_query("{ history(first:100) }").unwrap()["page"], 1);
    assert_eq!(t.post_query("{ pullRequests(first:100) }").unwrap()["pr"], true);
    assert_eq!(t.post_query("{ history(first:100) }").unwrap()["page"], 2);

    let err = t.post_query("{ history(first:100) }").unwrap_err();
    assert!(matches!(err, SummaryError::Transport { status: 404, .. }));

    let err = t.post_query("{ pullRequest(number: 3) }").unwrap_err();
    assert!(matches!(err, SummaryError::Transport { status: 404, .. }));
  }

  #[test]
  #[serial]
  fn env_transport_rejects_invalid_fixture_json() {
    let _env = test_support::with_env(&[(ENV_PULL_COMMIT_PAGES, "not json")]);
    let err = EnvTransport::from_env().err().expect("invalid fixture");
    assert!(matches!(err, SummaryError::InvalidJson { .. }));
  }

  #[test]
  #[serial]
  fn build_transport_requires_token_without_fixtures() {
    for k in [ENV_HISTORY_PAGES, ENV_PULL_REQUEST_PAGES, ENV_PULL_COMMIT_PAGES] {
      std::env::remove_var(k);
    }
    let err = build_transport(None, DEFAULT_ENDPOINT, Duration::from_secs(1)).err().expect("no token");
    assert!(err.to_string().contains("Missing token"));

    let http = build_transport(Some("t".into()), DEFAULT_ENDPOINT, Duration::from_secs(1)).unwrap();
    assert_eq!(http.endpoint(), DEFAULT_ENDPOINT);
  }

  #[test]
  #[serial]
  fn discover_token_prefers_env() {
    let _env = test_support::with_env(&[("GITHUB_TOKEN", "from-env")]);
    assert_eq!(discover_token().as_deref(), Some("from-env"));
  }
}
