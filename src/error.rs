// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Error taxonomy for fetching and mapping GitHub data
// role: errors
// outputs: SummaryError (fatal, aborts the run) and RecordUnusable (recovered by dropping one commit)
// invariants: Transport errors always carry endpoint, status and a clipped body excerpt
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SummaryError>;

/// Errors that abort an export run.
#[derive(Error, Debug)]
pub enum SummaryError {
  /// Non-success HTTP status.
  #[error("request to {endpoint} failed with status {status}: {body}")]
  Transport {
    endpoint: String,
    status: u16,
    body: String,
  },

  #[error("request to {endpoint} failed: {message}")]
  Network { endpoint: String, message: String },

  #[error("response from {endpoint} is not valid JSON: {message}")]
  InvalidJson { endpoint: String, message: String },

  #[error("GraphQL errors: {}", messages.join(", "))]
  GraphQl { messages: Vec<String> },

  /// A page is missing a structural key; pagination state cannot be trusted.
  #[error("unexpected page shape in {stream} stream: {detail}")]
  PageShape { stream: &'static str, detail: String },

  #[error("malformed pull request record (field `{field}`): {detail}")]
  MalformedPullRequest { field: &'static str, detail: String },

  #[error("run deadline exceeded after {elapsed_secs}s while fetching {stream}")]
  DeadlineExceeded { stream: &'static str, elapsed_secs: u64 },
}

/// A single commit record could not be mapped and is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("commit record unusable: missing or malformed `{field}`")]
pub struct RecordUnusable {
  pub field: &'static str,
}
