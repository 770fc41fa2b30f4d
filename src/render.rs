// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Render the monthly action timeline as the plain-text summary report
// role: render/text
// inputs: Ordered Vec<Action>, DisplayZone for timestamps, Language for labels
// outputs: Text written to any io::Write sink
// invariants:
// - Commit block = 4 lines; pull request block = 4 lines + closed issues (header + one line each) when present
// - Every block is followed by exactly one blank line, including the last
// - Closed issues keep API order
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;

use clap::ValueEnum;

use crate::model::{Action, ActionContent, Commit, MergedPullRequest};
use crate::util::{format_grouped, DisplayZone};

const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Report label language.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Language {
  #[default]
  En,
  De,
}

struct Labels {
  direct_commit: &'static str,
  id: &'static str,
  completed: &'static str,
  changes: &'static str,
  files: &'static str,
  lines: &'static str,
  /// Text between `+<additions>/` and `-<deletions>`.
  deletions_gap: &'static str,
  total_commits: &'static str,
  closed_issues: &'static str,
  thousands: char,
}

impl Language {
  fn labels(self) -> Labels {
    match self {
      Language::En => Labels {
        direct_commit: "Direct commit",
        id: "ID",
        completed: "Completed",
        changes: "Changes",
        files: "files",
        lines: "lines",
        deletions_gap: "",
        total_commits: "Total commits",
        closed_issues: "Closed issues",
        thousands: ',',
      },
      Language::De => Labels {
        direct_commit: "Direkter Commit",
        id: "ID",
        completed: "Fertiggestellt",
        changes: "Änderungen",
        files: "Dateien",
        lines: "Zeilen",
        deletions_gap: " ",
        total_commits: "Commits gesamt",
        closed_issues: "Geschlossene Issues",
        thousands: '.',
      },
    }
  }
}

pub struct ReportRenderer {
  zone: DisplayZone,
  labels: Labels,
}

impl ReportRenderer {
  pub fn new(zone: DisplayZone, language: Language) -> Self {
    Self {
      zone,
      labels: language.labels(),
    }
  }

  pub fn render<W: Write>(&self, actions: &[Action], out: &mut W) -> std::io::Result<()> {
    for action in actions {
      match &action.content {
        ActionContent::Commit(commit) => self.render_commit(commit, out)?,
        ActionContent::PullRequest(pr) => self.render_pull_request(pr, out)?,
      }

      writeln!(out)?;
    }

    Ok(())
  }

  fn change_stats(&self, changed_files: u64, additions: u64, deletions: u64) -> String {
    let l = &self.labels;

    format!(
      "{} {}, +{}/{}-{} {}",
      changed_files,
      l.files,
      format_grouped(additions, l.thousands),
      l.deletions_gap,
      format_grouped(deletions, l.thousands),
      l.lines
    )
  }

  fn render_commit<W: Write>(&self, commit: &Commit, out: &mut W) -> std::io::Result<()> {
    let l = &self.labels;

    writeln!(out, "{}: {}", l.direct_commit, commit.message)?;
    writeln!(out, "  {}: {}", l.id, commit.short_oid)?;
    writeln!(out, "  {}: {}", l.completed, self.zone.format(commit.authored_at, TIMESTAMP_FORMAT))?;
    writeln!(
      out,
      "  {}: {}",
      l.changes,
      self.change_stats(commit.changed_files, commit.additions, commit.deletions)
    )
  }

  fn render_pull_request<W: Write>(&self, pr: &MergedPullRequest, out: &mut W) -> std::io::Result<()> {
    let l = &self.labels;

    writeln!(out, "#{}: {}", pr.number, pr.title)?;
    writeln!(out, "  {}: {}", l.total_commits, pr.commit_count)?;
    writeln!(out, "  {}: {}", l.completed, self.zone.format(pr.merged_at, TIMESTAMP_FORMAT))?;
    writeln!(
      out,
      "  {}: {}",
      l.changes,
      self.change_stats(pr.changed_files, pr.additions, pr.deletions)
    )?;

    if !pr.closed_issues.is_empty() {
      writeln!(out, "  {}:", l.closed_issues)?;
      for issue in &pr.closed_issues {
        writeln!(out, "  - #{}: {}", issue.number, issue.title)?;
      }
    }

    Ok(())
  }
}

#[cfg(test)]
pub(crate) fn render_to_string(actions: &[Action], zone: DisplayZone, language: Language) -> String {
  let mut buf: Vec<u8> = Vec::new();
  ReportRenderer::new(zone, language)
    .render(actions, &mut buf)
    .expect("writing to a Vec cannot fail");

  String::from_utf8_lossy(&buf).to_string()
}
