//! Predicate evaluation: does one incident satisfy a filter specification?
//!
//! Every dimension is optional. An empty set or blank search text places no
//! constraint on that dimension; it never means "match nothing". The overall
//! match is the AND of all dimensions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Incident, Severity, Status};

/// Inclusive created-at window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub from: DateTime<Utc>,
  pub to: DateTime<Utc>,
}

impl DateRange {
  pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
    self.from <= *ts && *ts <= self.to
  }
}

/// Declarative constraints produced by the dashboard's filter controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSpec {
  pub search_text: Option<String>,
  pub severities: Vec<Severity>,
  pub statuses: Vec<Status>,
  /// Tag values; matched case-insensitively against the incident's tags.
  pub types: Vec<String>,
  /// Team substrings; `ownerTeam` only has to contain one of them.
  pub teams: Vec<String>,
  pub date_range: Option<DateRange>,
}

impl FilterSpec {
  /// True when no dimension constrains the result.
  pub fn is_empty(&self) -> bool {
    self
      .search_text
      .as_deref()
      .map_or(true, |s| s.trim().is_empty())
      && self.severities.is_empty()
      && self.statuses.is_empty()
      && self.types.is_empty()
      && self.teams.is_empty()
      && self.date_range.is_none()
  }

  /// One-shot evaluation. Prefer `Predicate::new` when testing many incidents.
  pub fn matches(&self, incident: &Incident) -> bool {
    Predicate::new(self).matches(incident)
  }
}

/// A FilterSpec with its text needles lowercased once up front.
#[derive(Debug, Clone)]
pub struct Predicate<'a> {
  search: Option<String>,
  severities: &'a [Severity],
  statuses: &'a [Status],
  types: Vec<String>,
  teams: Vec<String>,
  date_range: Option<DateRange>,
}

impl<'a> Predicate<'a> {
  pub fn new(spec: &'a FilterSpec) -> Self {
    let search = spec
      .search_text
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_lowercase);

    Self {
      search,
      severities: &spec.severities,
      statuses: &spec.statuses,
      types: lowered(&spec.types),
      teams: lowered(&spec.teams),
      date_range: spec.date_range,
    }
  }

  pub fn matches(&self, incident: &Incident) -> bool {
    self.matches_search(incident)
      && self.matches_severity(incident)
      && self.matches_status(incident)
      && self.matches_type(incident)
      && self.matches_team(incident)
      && self.matches_date(incident)
  }

  fn matches_search(&self, incident: &Incident) -> bool {
    let needle = match &self.search {
      Some(n) => n,
      None => return true,
    };
    contains_ci(&incident.id, needle)
      || contains_ci(&incident.title, needle)
      || contains_ci(&incident.description, needle)
      || incident.tags.iter().any(|t| contains_ci(t, needle))
  }

  fn matches_severity(&self, incident: &Incident) -> bool {
    self.severities.is_empty() || self.severities.contains(&incident.severity)
  }

  fn matches_status(&self, incident: &Incident) -> bool {
    self.statuses.is_empty() || self.statuses.contains(&incident.status)
  }

  fn matches_type(&self, incident: &Incident) -> bool {
    if self.types.is_empty() {
      return true;
    }
    incident.tags.iter().any(|tag| {
      let tag = tag.to_lowercase();
      self.types.iter().any(|t| tag == *t)
    })
  }

  // Substring, not equality: "Platform" selects "Platform Team".
  fn matches_team(&self, incident: &Incident) -> bool {
    self.teams.is_empty() || self.teams.iter().any(|t| contains_ci(&incident.owner_team, t))
  }

  fn matches_date(&self, incident: &Incident) -> bool {
    self
      .date_range
      .map_or(true, |range| range.contains(&incident.created_at))
  }
}

/// `needle` must already be lowercase.
fn contains_ci(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(needle)
}

fn lowered(values: &[String]) -> Vec<String> {
  values
    .iter()
    .map(|v| v.trim().to_lowercase())
    .filter(|v| !v.is_empty())
    .collect()
}
