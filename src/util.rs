// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for display timezones, number grouping, and safe text clipping
// role: utilities/helpers
// inputs: Various primitives; DateTime
// outputs: Formatted timestamps and numbers, clipped excerpts
// invariants:
// - clip_text never splits a UTF-8 character
// - format_grouped output is locale-independent for a given separator
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::str::FromStr;

use anyhow::bail;
use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;

/// Timezone used for displayed timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
  Local,
  Utc,
  Named(Tz),
}

impl FromStr for DisplayZone {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> anyhow::Result<Self> {
    if s.eq_ignore_ascii_case("local") {
      return Ok(DisplayZone::Local);
    }

    if s.eq_ignore_ascii_case("utc") {
      return Ok(DisplayZone::Utc);
    }

    match s.parse::<Tz>() {
      Ok(zone) => Ok(DisplayZone::Named(zone)),
      Err(_) => bail!("unknown timezone {s:?}; use local, utc, or an IANA name like Europe/Berlin"),
    }
  }
}

impl DisplayZone {
  /// Render `dt` with a chrono format string in this zone.
  pub fn format(&self, dt: DateTime<Utc>, fmt: &str) -> String {
    match self {
      DisplayZone::Local => dt.with_timezone(&Local).format(fmt).to_string(),
      DisplayZone::Utc => dt.format(fmt).to_string(),
      DisplayZone::Named(zone) => dt.with_timezone(zone).format(fmt).to_string(),
    }
  }
}

/// Format `n` with `sep` between groups of three digits: `1234567` -> `1,234,567`.
pub fn format_grouped(n: u64, sep: char) -> String {
  let digits = n.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);

  for (i, ch) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(sep);
    }
    out.push(ch);
  }

  out
}

/// Clip `text` to at most `max_chars` characters, marking the cut.
pub fn clip_text(text: &str, max_chars: usize) -> String {
  match text.char_indices().nth(max_chars) {
    Some((end, _)) => format!("{}… (truncated)", &text[..end]),
    None => text.to_string(),
  }
}
