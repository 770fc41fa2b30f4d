use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Action;

// Windowing-related types live here to keep export focused.

static RE_EXPORT_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0[1-9]|1[012])/(\d{4})$").expect("valid regex"));

/// A calendar month, bounded in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
  pub year: i32,
  pub month: u32,
}

impl MonthWindow {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    if !(1..=12).contains(&month) {
      bail!("invalid month {month}, expected 1-12");
    }
    Ok(Self { year, month })
  }

  /// Parse `MM/yyyy`, e.g. `05/2020`.
  pub fn parse_export_date(raw: &str) -> Result<Self> {
    let Some(caps) = RE_EXPORT_DATE.captures(raw.trim()) else {
      bail!("The format to specify the date for which exports are run must be MM/yyyy, e.g. 05/2020 (got {raw:?})");
    };
    let month: u32 = caps[1].parse().context("parsing month in --date")?;
    let year: i32 = caps[2].parse().context("parsing year in --date")?;

    Self::new(year, month)
  }

  /// `[first instant of the month, first instant of the next month)` in UTC.
  pub fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let (next_y, next_m) = if self.month == 12 { (self.year + 1, 1) } else { (self.year, self.month + 1) };

    let start = first_instant(self.year, self.month)?;
    let end = first_instant(next_y, next_m)?;

    Ok((start, end))
  }

  /// Stable label used for output file names, e.g. `2022-05`.
  pub fn label(&self) -> String {
    format!("{:04}-{:02}", self.year, self.month)
  }
}

fn first_instant(year: i32, month: u32) -> Result<DateTime<Utc>> {
  let date = NaiveDate::from_ymd_opt(year, month, 1).with_context(|| format!("{year:04}-{month:02} is out of range"))?;
  let naive = date.and_hms_opt(0, 0, 0).context("midnight")?;

  Ok(Utc.from_utc_datetime(&naive))
}

/// Keep actions dated inside `window` and sort them ascending by date.
///
/// The sort is stable, so equal dates keep their input order.
pub fn select_in_window(actions: Vec<Action>, window: &MonthWindow) -> Result<Vec<Action>> {
  let (start, end) = window.bounds()?;

  let mut selected: Vec<Action> = actions.into_iter().filter(|a| a.date >= start && a.date < end).collect();
  selected.sort_by_key(|a| a.date);

  Ok(selected)
}
