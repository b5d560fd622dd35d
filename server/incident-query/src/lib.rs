//! Incident Query Engine: deterministic, rule-based.
//!
//! Validates inbound incident records, filters them against a declarative
//! `FilterSpec`, sorts with the dashboard's default order, and derives the
//! counts and distributions the dashboard cards render.
//!
//! No DB, no network; pure computation over a snapshot the caller owns.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod query;
pub mod types;

pub use aggregate::{summarize, DashboardSummary, Period};
pub use config::Config;
pub use error::QueryError;
pub use filter::{DateRange, FilterSpec, Predicate};
pub use query::{query, query_owned, SortSpec};
pub use types::{InboundIncident, Incident, Severity, Status};

use chrono::{DateTime, Utc};

use crate::types::{QueryRequest, QueryResponse};

/// Run one CLI request: validate, query, summarize (no I/O).
pub fn run(
  request: &QueryRequest,
  config: &Config,
  now: DateTime<Utc>,
) -> Result<QueryResponse, QueryError> {
  let incidents = normalize::normalize_all(&request.incidents)?;
  let sort = request.sort.unwrap_or(config.default_sort);
  let matched = query_owned(&incidents, &request.filter, sort);
  let period = request.period.unwrap_or_else(|| config.period_ending(now));
  let summary = summarize(&matched, period);
  Ok(QueryResponse {
    incidents: matched,
    summary,
  })
}
