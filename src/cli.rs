use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use crate::github::transport::{discover_token, env_wants_mock, DEFAULT_ENDPOINT};
use crate::render::Language;
use crate::util::DisplayZone;
use crate::window::MonthWindow;

#[derive(Parser, Debug)]
#[command(
    name = "github-activity-summary",
    version,
    about = "Export a monthly summary of direct commits and merged pull requests from GitHub",
    long_about = None
)]
pub struct Cli {
  /// The GitHub organization (or user) owning the repository
  #[arg(short = 'o', long)]
  pub organization: String,

  /// The GitHub repository to scan
  #[arg(short = 'r', long)]
  pub repository: String,

  /// The branch unto which pull requests are merged
  #[arg(short = 'b', long)]
  pub branch: String,

  /// GitHub personal access token (default: GITHUB_TOKEN, GH_TOKEN, then `gh auth token`)
  #[arg(short = 't', long)]
  pub token: Option<String>,

  /// Base folder under which to place the export file
  #[arg(short = 'f', long)]
  pub folder: PathBuf,

  /// Month to export, in format MM/yyyy, e.g. 05/2020
  #[arg(short = 'd', long)]
  pub date: String,

  /// Timezone for displayed timestamps: local, utc, or an IANA name
  #[arg(long, default_value = "local")]
  pub tz: String,

  /// Language of report labels
  #[arg(long, value_enum, default_value_t = Language::En)]
  pub language: Language,

  /// GraphQL endpoint (GitHub Enterprise: https://<host>/api/graphql)
  #[arg(long, default_value = DEFAULT_ENDPOINT)]
  pub endpoint: String,

  /// Per-request timeout in seconds
  #[arg(long, default_value_t = 30)]
  pub timeout_secs: u64,

  /// Abort the whole run after this many seconds
  #[arg(long)]
  pub run_timeout_secs: Option<u64>,

  /// Log debug details (page counts, dropped records) to stderr
  #[arg(short, long)]
  pub verbose: bool,
}

#[derive(Debug)]
pub struct EffectiveConfig {
  pub organization: String,
  pub repository: String,
  pub branch: String,
  pub token: Option<String>,
  pub out_file: PathBuf,
  pub window: MonthWindow,
  pub zone: DisplayZone,
  pub language: Language,
  pub endpoint: String,
  pub timeout: Duration,
  pub run_timeout: Option<Duration>,
}

/// `<folder>/<yyyy>-<MM> GitHubExport.txt`
pub fn export_file_path(folder: &std::path::Path, window: &MonthWindow) -> PathBuf {
  folder.join(format!("{} GitHubExport.txt", window.label()))
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let window = MonthWindow::parse_export_date(&cli.date)?;
  let zone: DisplayZone = cli.tz.parse().context("parsing --tz")?;

  // Token discovery is skipped when fixtures drive the transport.
  let token = match cli.token {
    Some(t) if !t.trim().is_empty() => Some(t),
    _ if env_wants_mock() => None,
    _ => discover_token(),
  };

  Ok(EffectiveConfig {
    out_file: export_file_path(&cli.folder, &window),
    organization: cli.organization,
    repository: cli.repository,
    branch: cli.branch,
    token,
    window,
    zone,
    language: cli.language,
    endpoint: cli.endpoint,
    timeout: Duration::from_secs(cli.timeout_secs),
    run_timeout: cli.run_timeout_secs.map(Duration::from_secs),
  })
}
