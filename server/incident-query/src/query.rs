//! Query engine: filter a snapshot with a `Predicate`, then impose a stable order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::filter::{FilterSpec, Predicate};
use crate::types::Incident;

/// Named ordering strategies. The default is the one every dashboard page uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortSpec {
  /// Severity ascending (1 first), then createdAt descending.
  #[default]
  SeverityThenNewest,
  Newest,
  Oldest,
  Id,
  RecentlyUpdated,
}

impl SortSpec {
  pub fn compare(self, a: &Incident, b: &Incident) -> Ordering {
    match self {
      Self::SeverityThenNewest => a
        .severity
        .cmp(&b.severity)
        .then_with(|| b.created_at.cmp(&a.created_at)),
      Self::Newest => b.created_at.cmp(&a.created_at),
      Self::Oldest => a.created_at.cmp(&b.created_at),
      Self::Id => a.id.cmp(&b.id),
      Self::RecentlyUpdated => b.updated_at.cmp(&a.updated_at),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::SeverityThenNewest => "severity_then_newest",
      Self::Newest => "newest",
      Self::Oldest => "oldest",
      Self::Id => "id",
      Self::RecentlyUpdated => "recently_updated",
    }
  }
}

impl FromStr for SortSpec {
  type Err = QueryError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "" | "default" | "severity_then_newest" | "severity" => Ok(Self::SeverityThenNewest),
      "newest" | "created_desc" => Ok(Self::Newest),
      "oldest" | "created_asc" => Ok(Self::Oldest),
      "id" => Ok(Self::Id),
      "recently_updated" | "updated_desc" => Ok(Self::RecentlyUpdated),
      other => Err(QueryError::validation(
        "sort",
        &format!(
          "unknown sort {:?}; expected severity_then_newest|newest|oldest|id|recently_updated",
          other
        ),
      )),
    }
  }
}

impl fmt::Display for SortSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Filter then sort. Borrows from `incidents`; the input is never modified.
///
/// The sort is stable, so incidents that tie on every key keep their input order.
pub fn query<'a>(
  incidents: &'a [Incident],
  filter: &FilterSpec,
  sort: SortSpec,
) -> Vec<&'a Incident> {
  let predicate = Predicate::new(filter);
  let mut out: Vec<&Incident> = incidents.iter().filter(|i| predicate.matches(i)).collect();
  out.sort_by(|a, b| sort.compare(a, b));

  tracing::debug!(
    total = incidents.len(),
    matched = out.len(),
    sort = %sort,
    "incident query"
  );
  out
}

/// Same as `query`, cloning the matches so the caller can drop the snapshot.
pub fn query_owned(incidents: &[Incident], filter: &FilterSpec, sort: SortSpec) -> Vec<Incident> {
  query(incidents, filter, sort).into_iter().cloned().collect()
}
