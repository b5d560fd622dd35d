//! Swappable incident data provider and its in-memory mock.
//!
//! The query engine never talks to a `DataSource`; handlers fetch a snapshot
//! here and hand it to the engine.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use incident_query::normalize::normalize_all;
use incident_query::types::{
  IncidentLearning, LearningCategory, TimelineEvent, TimelineEventType,
};
use incident_query::{InboundIncident, Incident, QueryError};
use serde::Deserialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::DataError;

const SEED_JSON: &str = include_str!("../../../fixtures/seed_incidents.json");

/// Body of an append-timeline-event request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTimelineEvent {
  pub message: String,
  #[serde(rename = "type")]
  pub kind: String,
  #[serde(default)]
  pub user: String,
}

/// Body of an append-learning request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLearning {
  pub category: String,
  pub content: String,
  #[serde(default)]
  pub created_by: String,
}

#[async_trait]
pub trait DataSource: Send + Sync {
  fn backend_tag(&self) -> &'static str;

  async fn fetch_incidents(&self) -> Result<Vec<Incident>, DataError>;

  async fn fetch_incident_by_id(&self, id: &str) -> Result<Incident, DataError>;

  async fn append_timeline_event(
    &self,
    incident_id: &str,
    event: NewTimelineEvent,
  ) -> Result<Incident, DataError>;

  async fn append_learning(
    &self,
    incident_id: &str,
    learning: NewLearning,
  ) -> Result<Incident, DataError>;
}

/// In-memory collection with artificial latency. Resets on restart.
pub struct InMemoryDataSource {
  incidents: RwLock<Vec<Incident>>,
  latency: Duration,
}

impl InMemoryDataSource {
  pub fn new(incidents: Vec<Incident>, latency: Duration) -> Self {
    Self {
      incidents: RwLock::new(incidents),
      latency,
    }
  }

  /// Load the embedded seed dataset.
  pub fn seeded(latency: Duration) -> Result<Self, DataError> {
    Ok(Self::new(seed_incidents()?, latency))
  }

  async fn simulate_latency(&self) {
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }
  }

  /// Apply `f` to one incident under the write lock and return the result.
  async fn update<F>(&self, incident_id: &str, f: F) -> Result<Incident, DataError>
  where
    F: FnOnce(&mut Incident),
  {
    self.simulate_latency().await;
    let mut incidents = self.incidents.write().await;
    let incident = incidents
      .iter_mut()
      .find(|i| i.id == incident_id)
      .ok_or_else(|| DataError::not_found(incident_id))?;
    f(incident);
    Ok(incident.clone())
  }
}

#[async_trait]
impl DataSource for InMemoryDataSource {
  fn backend_tag(&self) -> &'static str {
    "in_memory"
  }

  async fn fetch_incidents(&self) -> Result<Vec<Incident>, DataError> {
    self.simulate_latency().await;
    Ok(self.incidents.read().await.clone())
  }

  async fn fetch_incident_by_id(&self, id: &str) -> Result<Incident, DataError> {
    self.simulate_latency().await;
    self
      .incidents
      .read()
      .await
      .iter()
      .find(|i| i.id == id)
      .cloned()
      .ok_or_else(|| DataError::not_found(id))
  }

  async fn append_timeline_event(
    &self,
    incident_id: &str,
    event: NewTimelineEvent,
  ) -> Result<Incident, DataError> {
    let kind = TimelineEventType::from_str_loose(&event.kind).ok_or_else(|| {
      QueryError::validation("type", "expected update|action|notification|resolution")
    })?;
    let message = event.message.trim();
    if message.is_empty() {
      return Err(QueryError::validation("message", "must not be empty").into());
    }

    let now = Utc::now();
    let entry = TimelineEvent {
      id: Uuid::new_v4().to_string(),
      timestamp: now,
      message: message.to_string(),
      kind,
      user: event.user.trim().to_string(),
    };
    let updated = self
      .update(incident_id, move |incident| {
        incident.timeline.push(entry);
        incident.updated_at = incident.updated_at.max(now);
      })
      .await?;
    tracing::info!(incident = %updated.id, entries = updated.timeline.len(), "timeline event appended");
    Ok(updated)
  }

  async fn append_learning(
    &self,
    incident_id: &str,
    learning: NewLearning,
  ) -> Result<Incident, DataError> {
    let category = LearningCategory::from_str_loose(&learning.category).ok_or_else(|| {
      QueryError::validation("category", "expected went_well|to_improve|action_item")
    })?;
    let content = learning.content.trim();
    if content.is_empty() {
      return Err(QueryError::validation("content", "must not be empty").into());
    }

    let now = Utc::now();
    let entry = IncidentLearning {
      id: Uuid::new_v4().to_string(),
      category,
      content: content.to_string(),
      created_by: learning.created_by.trim().to_string(),
      created_at: now,
    };
    let updated = self
      .update(incident_id, move |incident| {
        incident.learnings.push(entry);
        incident.updated_at = incident.updated_at.max(now);
      })
      .await?;
    tracing::info!(incident = %updated.id, entries = updated.learnings.len(), "learning appended");
    Ok(updated)
  }
}

/// Parse and validate the embedded seed dataset.
pub fn seed_incidents() -> Result<Vec<Incident>, DataError> {
  let raw: Vec<InboundIncident> = serde_json::from_str(SEED_JSON).map_err(QueryError::from)?;
  Ok(normalize_all(&raw)?)
}

#[cfg(test)]
mod tests {
  use super::*;
  use incident_query::Status;

  fn source() -> InMemoryDataSource {
    InMemoryDataSource::seeded(Duration::ZERO).unwrap()
  }

  #[tokio::test]
  async fn fetch_returns_full_seed() {
    let incidents = source().fetch_incidents().await.unwrap();
    assert_eq!(incidents.len(), 7);
    assert_eq!(incidents[0].id, "INC-2023-001");
  }

  #[tokio::test]
  async fn fetch_by_id_reports_not_found() {
    let err = source().fetch_incident_by_id("INC-1999-999").await.unwrap_err();
    assert!(matches!(err, DataError::NotFound { .. }));
  }

  #[tokio::test]
  async fn append_timeline_preserves_history() {
    let source = source();
    let before = source.fetch_incident_by_id("INC-2023-001").await.unwrap();

    let after = source
      .append_timeline_event(
        "INC-2023-001",
        NewTimelineEvent {
          message: "Postmortem scheduled".into(),
          kind: "update".into(),
          user: "maria.chen".into(),
        },
      )
      .await
      .unwrap();

    assert_eq!(after.timeline.len(), before.timeline.len() + 1);
    assert_eq!(&after.timeline[..before.timeline.len()], &before.timeline[..]);
    assert_eq!(after.timeline.last().unwrap().message, "Postmortem scheduled");
    assert!(after.updated_at >= before.updated_at);
    // Status transitions belong to the application, not the append.
    assert_eq!(after.status, Status::Resolved);
    assert_eq!(after.resolved_at, before.resolved_at);

    let refetched = source.fetch_incident_by_id("INC-2023-001").await.unwrap();
    assert_eq!(refetched, after);
  }

  #[tokio::test]
  async fn resolution_event_does_not_change_status() {
    let source = source();
    let after = source
      .append_timeline_event(
        "INC-2023-007",
        NewTimelineEvent {
          message: "Certificate renewed manually".into(),
          kind: "resolution".into(),
          user: String::new(),
        },
      )
      .await
      .unwrap();
    assert_eq!(after.status, Status::Open);
    assert!(after.resolved_at.is_none());
  }

  #[tokio::test]
  async fn append_rejects_unknown_type_and_empty_message() {
    let source = source();
    let err = source
      .append_timeline_event(
        "INC-2023-001",
        NewTimelineEvent {
          message: "x".into(),
          kind: "page".into(),
          user: String::new(),
        },
      )
      .await
      .unwrap_err();
    assert!(err.to_string().contains("type"));

    let err = source
      .append_timeline_event(
        "INC-2023-001",
        NewTimelineEvent {
          message: "   ".into(),
          kind: "update".into(),
          user: String::new(),
        },
      )
      .await
      .unwrap_err();
    assert!(err.to_string().contains("message"));
  }

  #[tokio::test]
  async fn append_learning_to_missing_incident_is_not_found() {
    let err = source()
      .append_learning(
        "INC-404",
        NewLearning {
          category: "action_item".into(),
          content: "Add alert".into(),
          created_by: "sam".into(),
        },
      )
      .await
      .unwrap_err();
    assert!(matches!(err, DataError::NotFound { .. }));
  }

  #[tokio::test]
  async fn append_learning_appends() {
    let source = source();
    let after = source
      .append_learning(
        "INC-2023-006",
        NewLearning {
          category: "went-well".into(),
          content: "Backlog drained without data loss".into(),
          created_by: "priya.n".into(),
        },
      )
      .await
      .unwrap();
    assert_eq!(after.learnings.len(), 2);
    assert_eq!(after.learnings[1].category, LearningCategory::WentWell);
  }
}
