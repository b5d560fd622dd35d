//! Summary counts and groupings for dashboard cards and charts.
//!
//! All functions are total over validated incidents and never fail. Unlike
//! `group_by`, the distributions always enumerate the full enum domain so a
//! chart can render empty bars.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Incident, IncidentMetrics, Severity, Status};

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
}

impl Period {
  pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
    self.start <= *ts && *ts < self.end
  }
}

pub fn count_active(incidents: &[Incident]) -> usize {
  incidents.iter().filter(|i| i.status.is_active()).count()
}

pub fn count_by_severity(incidents: &[Incident], severity: Severity) -> usize {
  incidents.iter().filter(|i| i.severity == severity).count()
}

/// Incidents whose `resolvedAt` falls in `[start, end)`.
pub fn count_resolved_in_period(
  incidents: &[Incident],
  start: DateTime<Utc>,
  end: DateTime<Utc>,
) -> usize {
  let period = Period { start, end };
  incidents
    .iter()
    .filter(|i| i.resolved_at.map_or(false, |ts| period.contains(&ts)))
    .count()
}

/// Group by a single key. Input order is preserved inside each group and
/// only keys with at least one member appear.
pub fn group_by<'a, K, F>(incidents: &'a [Incident], mut key_fn: F) -> BTreeMap<K, Vec<&'a Incident>>
where
  K: Ord,
  F: FnMut(&Incident) -> K,
{
  let mut groups: BTreeMap<K, Vec<&Incident>> = BTreeMap::new();
  for incident in incidents {
    groups.entry(key_fn(incident)).or_default().push(incident);
  }
  groups
}

/// Group by every key an incident yields (tags, impacted systems). An incident
/// lands once in each distinct group it names.
pub fn group_by_each<'a, K, F, I>(
  incidents: &'a [Incident],
  mut keys_fn: F,
) -> BTreeMap<K, Vec<&'a Incident>>
where
  K: Ord,
  F: FnMut(&'a Incident) -> I,
  I: IntoIterator<Item = K>,
{
  let mut groups: BTreeMap<K, Vec<&Incident>> = BTreeMap::new();
  for incident in incidents {
    for key in keys_fn(incident) {
      let members = groups.entry(key).or_default();
      if !members.last().map_or(false, |last| std::ptr::eq(*last, incident)) {
        members.push(incident);
      }
    }
  }
  groups
}

pub fn distribution_by_severity(incidents: &[Incident]) -> BTreeMap<Severity, usize> {
  let mut dist: BTreeMap<Severity, usize> = Severity::ALL.iter().map(|s| (*s, 0)).collect();
  for incident in incidents {
    *dist.entry(incident.severity).or_insert(0) += 1;
  }
  dist
}

pub fn distribution_by_status(incidents: &[Incident]) -> BTreeMap<Status, usize> {
  let mut dist: BTreeMap<Status, usize> = Status::ALL.iter().map(|s| (*s, 0)).collect();
  for incident in incidents {
    *dist.entry(incident.status).or_insert(0) += 1;
  }
  dist
}

pub fn mean_time_to_acknowledge(incidents: &[Incident]) -> Option<f64> {
  mean_of(incidents, |m| m.time_to_acknowledge)
}

pub fn mean_time_to_resolve(incidents: &[Incident]) -> Option<f64> {
  mean_of(incidents, |m| m.time_to_resolve)
}

pub fn total_affected_users(incidents: &[Incident]) -> u64 {
  incidents
    .iter()
    .filter_map(|i| i.metrics.as_ref().and_then(|m| m.affected_users))
    .fold(0u64, u64::saturating_add)
}

// None when no incident reports the metric. Summed as f64 so large
// durations cannot overflow.
fn mean_of(incidents: &[Incident], pick: impl Fn(&IncidentMetrics) -> Option<u64>) -> Option<f64> {
  let (sum, count) = incidents
    .iter()
    .filter_map(|i| i.metrics.as_ref().and_then(&pick))
    .fold((0f64, 0usize), |(sum, count), v| (sum + v as f64, count + 1));
  (count > 0).then(|| sum / count as f64)
}

/// Everything the dashboard cards render for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
  pub total: usize,
  pub active: usize,
  pub resolved_in_period: usize,
  pub period: Period,
  pub by_severity: BTreeMap<Severity, usize>,
  pub by_status: BTreeMap<Status, usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub mean_time_to_acknowledge: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub mean_time_to_resolve: Option<f64>,
  pub affected_users: u64,
}

pub fn summarize(incidents: &[Incident], period: Period) -> DashboardSummary {
  DashboardSummary {
    total: incidents.len(),
    active: count_active(incidents),
    resolved_in_period: count_resolved_in_period(incidents, period.start, period.end),
    period,
    by_severity: distribution_by_severity(incidents),
    by_status: distribution_by_status(incidents),
    mean_time_to_acknowledge: mean_time_to_acknowledge(incidents),
    mean_time_to_resolve: mean_time_to_resolve(incidents),
    affected_users: total_affected_users(incidents),
  }
}
