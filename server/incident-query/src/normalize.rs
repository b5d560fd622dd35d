//! Normalize inbound incident records into validated `Incident` values.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::QueryError;
use crate::types::*;

/// Parse and validate an InboundIncident into a canonical Incident.
pub fn normalize(raw: &InboundIncident) -> Result<Incident, QueryError> {
  let id = raw.id.trim();
  if id.is_empty() {
    return Err(QueryError::validation("id", "must not be empty"));
  }
  let title = raw.title.trim();
  if title.is_empty() {
    return Err(QueryError::validation("title", "must not be empty"));
  }

  // Validate severity
  let severity = Severity::try_from(raw.severity.clone())
    .map_err(|reason| QueryError::validation("severity", &reason))?;

  // Validate status
  let status = Status::from_str_loose(&raw.status).ok_or_else(|| {
    QueryError::validation(
      "status",
      "expected open|investigating|identified|monitoring|resolved|closed",
    )
  })?;

  // Validate + parse timestamps
  let created_at = parse_timestamp("createdAt", &raw.created_at)?;
  let updated_at = parse_timestamp("updatedAt", &raw.updated_at)?;
  if updated_at < created_at {
    return Err(QueryError::validation(
      "updatedAt",
      "must not precede createdAt",
    ));
  }
  let resolved_at = match &raw.resolved_at {
    Some(ts) if !ts.trim().is_empty() => Some(parse_timestamp("resolvedAt", ts)?),
    _ => None,
  };
  if status.is_terminal() && resolved_at.is_none() {
    return Err(QueryError::validation(
      "resolvedAt",
      "required once status is resolved or closed",
    ));
  }

  let timeline = raw
    .timeline
    .iter()
    .map(|e| {
      let kind = TimelineEventType::from_str_loose(&e.kind).ok_or_else(|| {
        QueryError::validation(
          "timeline[].type",
          "expected update|action|notification|resolution",
        )
      })?;
      Ok(TimelineEvent {
        id: e.id.trim().to_string(),
        timestamp: parse_timestamp("timeline[].timestamp", &e.timestamp)?,
        message: e.message.clone(),
        kind,
        user: e.user.trim().to_string(),
      })
    })
    .collect::<Result<Vec<_>, QueryError>>()?;

  let learnings = raw
    .learnings
    .iter()
    .map(|l| {
      let category = LearningCategory::from_str_loose(&l.category).ok_or_else(|| {
        QueryError::validation(
          "learnings[].category",
          "expected went_well|to_improve|action_item",
        )
      })?;
      Ok(IncidentLearning {
        id: l.id.trim().to_string(),
        category,
        content: l.content.clone(),
        created_by: l.created_by.trim().to_string(),
        created_at: parse_timestamp("learnings[].createdAt", &l.created_at)?,
      })
    })
    .collect::<Result<Vec<_>, QueryError>>()?;

  Ok(Incident {
    id: id.to_string(),
    title: title.to_string(),
    description: raw.description.trim().to_string(),
    severity,
    status,
    created_at,
    updated_at,
    resolved_at,
    impacted_systems: dedup_labels(&raw.impacted_systems),
    owner_team: raw.owner_team.trim().to_string(),
    tags: dedup_labels(&raw.tags),
    timeline,
    metrics: raw.metrics.clone(),
    learnings,
  })
}

/// Normalize a batch, rejecting the whole batch on the first invalid record
/// or on a repeated id.
pub fn normalize_all(raw: &[InboundIncident]) -> Result<Vec<Incident>, QueryError> {
  let mut seen = HashSet::with_capacity(raw.len());
  let mut out = Vec::with_capacity(raw.len());
  for record in raw {
    let incident = normalize(record)?;
    if !seen.insert(incident.id.clone()) {
      return Err(QueryError::validation(
        "id",
        &format!("duplicate incident id {}", incident.id),
      ));
    }
    out.push(incident);
  }
  Ok(out)
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, QueryError> {
  DateTime::parse_from_rfc3339(value.trim())
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| QueryError::validation(field, &format!("invalid RFC3339: {}", e)))
}

/// Trim labels, drop empties and exact repeats; first occurrence keeps its slot.
fn dedup_labels(labels: &[String]) -> Vec<String> {
  let mut seen = HashSet::new();
  labels
    .iter()
    .map(|l| l.trim())
    .filter(|l| !l.is_empty())
    .filter(|l| seen.insert(l.to_string()))
    .map(str::to_string)
    .collect()
}
