//! HTTP handlers for the incident data service.
//!
//! Every read fetches a fresh snapshot from the data source and runs the query
//! engine on it; nothing is cached between requests.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  Json,
};
use chrono::Utc;
use incident_query::aggregate::{group_by, group_by_each};
use incident_query::{query_owned, summarize, DashboardSummary, Incident, QueryError};

use crate::error::DataError;
use crate::params::{IncidentParams, MetricsParams};
use crate::source::{NewLearning, NewTimelineEvent};
use crate::state::AppState;

pub async fn health() -> &'static str {
  "ok"
}

pub async fn list_incidents(
  State(state): State<Arc<AppState>>,
  Query(params): Query<IncidentParams>,
) -> Result<Json<Vec<Incident>>, DataError> {
  let filter = params.filter()?;
  let sort = params.sort(state.config.engine.default_sort)?;
  let snapshot = state.source.fetch_incidents().await?;
  Ok(Json(query_owned(&snapshot, &filter, sort)))
}

pub async fn get_incident(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<Incident>, DataError> {
  Ok(Json(state.source.fetch_incident_by_id(&id).await?))
}

pub async fn append_timeline(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(event): Json<NewTimelineEvent>,
) -> Result<Json<Incident>, DataError> {
  Ok(Json(state.source.append_timeline_event(&id, event).await?))
}

pub async fn append_learning(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(learning): Json<NewLearning>,
) -> Result<Json<Incident>, DataError> {
  Ok(Json(state.source.append_learning(&id, learning).await?))
}

pub async fn metrics(
  State(state): State<Arc<AppState>>,
  Query(params): Query<MetricsParams>,
) -> Result<Json<DashboardSummary>, DataError> {
  let filter = params.incidents.filter()?;
  let period = params.period(state.config.engine.period_ending(Utc::now()))?;
  let snapshot = state.source.fetch_incidents().await?;
  let matched = query_owned(&snapshot, &filter, state.config.engine.default_sort);
  Ok(Json(summarize(&matched, period)))
}

/// Incident ids per group, each group in the request's sort order.
pub async fn groups(
  State(state): State<Arc<AppState>>,
  Path(dimension): Path<String>,
  Query(params): Query<IncidentParams>,
) -> Result<Json<BTreeMap<String, Vec<String>>>, DataError> {
  let filter = params.filter()?;
  let sort = params.sort(state.config.engine.default_sort)?;
  let snapshot = state.source.fetch_incidents().await?;
  let matched = query_owned(&snapshot, &filter, sort);

  let grouped = match dimension.as_str() {
    "team" => group_by(&matched, |i| i.owner_team.clone()),
    "status" => group_by(&matched, |i| i.status.as_str().to_string()),
    "severity" => group_by(&matched, |i| i.severity.name().to_string()),
    "tag" => group_by_each(&matched, |i| i.tags.iter().cloned()),
    "system" => group_by_each(&matched, |i| i.impacted_systems.iter().cloned()),
    other => {
      return Err(
        QueryError::validation(
          "dimension",
          &format!("unknown dimension {:?}; expected team|status|severity|tag|system", other),
        )
        .into(),
      )
    }
  };

  Ok(Json(
    grouped
      .into_iter()
      .map(|(key, members)| (key, members.iter().map(|i| i.id.clone()).collect()))
      .collect(),
  ))
}
