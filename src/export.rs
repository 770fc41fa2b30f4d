// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one export run: fetch both streams, reconcile, select the month, write the report file
// role: processing/orchestrator
// inputs: EffectiveConfig (repo, branch, month window, output path, display options)
// outputs: The written report file path
// side_effects: Network calls through the transport; creates the output folder; writes one text file
// invariants:
// - Both streams are fetched to completion before any output is produced
// - A fetch failure leaves no report file behind
// - The report is written only after reconciliation and windowing succeed
// errors: Propagates fetch and write errors with stream or file path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::EffectiveConfig;
use crate::github::fetch::RepoInspector;
use crate::github::paginate::RunDeadline;
use crate::github::queries::RepoRef;
use crate::github::transport::{build_transport, GraphqlTransport};
use crate::reconcile::reconcile;
use crate::render::ReportRenderer;
use crate::window::select_in_window;

pub fn run_export(cfg: &EffectiveConfig) -> Result<PathBuf> {
  let transport = build_transport(cfg.token.clone(), &cfg.endpoint, cfg.timeout)?;

  export_with(transport.as_ref(), cfg)
}

fn export_with(transport: &dyn GraphqlTransport, cfg: &EffectiveConfig) -> Result<PathBuf> {
  let repo = RepoRef {
    owner: cfg.organization.clone(),
    name: cfg.repository.clone(),
  };
  let inspector = RepoInspector::new(transport, repo, cfg.branch.clone(), RunDeadline::new(cfg.run_timeout));

  info!(
    organization = %cfg.organization,
    repository = %cfg.repository,
    branch = %cfg.branch,
    month = %cfg.window.label(),
    endpoint = transport.endpoint(),
    "starting export"
  );

  let (commits, pull_requests) = rayon::join(
    || inspector.fetch_branch_commits(),
    || inspector.fetch_merged_pull_requests(),
  );
  let commits = commits.context("fetching branch commits")?;
  let pull_requests = pull_requests.context("fetching merged pull requests")?;

  let actions = reconcile(commits, pull_requests);
  let selected = select_in_window(actions, &cfg.window)?;
  info!(actions = selected.len(), "actions in export month");

  write_report(cfg, &selected)?;
  info!(path = %cfg.out_file.display(), "export written");

  Ok(cfg.out_file.clone())
}

fn write_report(cfg: &EffectiveConfig, actions: &[crate::model::Action]) -> Result<()> {
  if let Some(parent) = cfg.out_file.parent() {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }

  let file = File::create(&cfg.out_file).with_context(|| format!("creating {}", cfg.out_file.display()))?;
  let mut out = BufWriter::new(file);

  ReportRenderer::new(cfg.zone, cfg.language)
    .render(actions, &mut out)
    .with_context(|| format!("writing {}", cfg.out_file.display()))?;
  out.flush().with_context(|| format!("writing {}", cfg.out_file.display()))?;

  Ok(())
}
