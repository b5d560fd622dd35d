//! Core types for the incident query engine (JSON contracts + record model).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{DashboardSummary, Period};
use crate::filter::FilterSpec;
use crate::query::SortSpec;

// ---------------------------------------------------------------------------
// Severity (canonical numeric rank, 1 = most severe)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "SeverityInput", into = "u8")]
pub enum Severity {
  Critical = 1,
  High = 2,
  Medium = 3,
  Low = 4,
  Info = 5,
}

impl Severity {
  pub const ALL: [Severity; 5] = [
    Self::Critical,
    Self::High,
    Self::Medium,
    Self::Low,
    Self::Info,
  ];

  pub fn from_rank(rank: i64) -> Option<Self> {
    match rank {
      1 => Some(Self::Critical),
      2 => Some(Self::High),
      3 => Some(Self::Medium),
      4 => Some(Self::Low),
      5 => Some(Self::Info),
      _ => None,
    }
  }

  /// Accepts a rank written as digits or one of the dashboard's severity names.
  pub fn from_str_loose(s: &str) -> Option<Self> {
    let s = s.trim();
    if let Ok(rank) = s.parse::<i64>() {
      return Self::from_rank(rank);
    }
    match s.to_ascii_lowercase().as_str() {
      "critical" | "crit" => Some(Self::Critical),
      "high" => Some(Self::High),
      "medium" | "med" => Some(Self::Medium),
      "low" => Some(Self::Low),
      "info" | "informational" | "lowest" => Some(Self::Info),
      _ => None,
    }
  }

  pub fn rank(self) -> u8 {
    self as u8
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::Critical => "critical",
      Self::High => "high",
      Self::Medium => "medium",
      Self::Low => "low",
      Self::Info => "info",
    }
  }
}

/// Either representation the dashboard sends for a severity: `1` or `"critical"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SeverityInput {
  Rank(i64),
  Name(String),
}

impl TryFrom<SeverityInput> for Severity {
  type Error = String;

  fn try_from(value: SeverityInput) -> Result<Self, Self::Error> {
    match value {
      SeverityInput::Rank(rank) => {
        Severity::from_rank(rank).ok_or_else(|| format!("rank {} outside 1..=5", rank))
      }
      SeverityInput::Name(name) => Severity::from_str_loose(&name)
        .ok_or_else(|| format!("unknown severity {:?}", name)),
    }
  }
}

impl From<Severity> for u8 {
  fn from(s: Severity) -> u8 {
    s.rank()
  }
}

// ---------------------------------------------------------------------------
// Status lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Status {
  Open,
  Investigating,
  Identified,
  Monitoring,
  Resolved,
  Closed,
}

impl Status {
  pub const ALL: [Status; 6] = [
    Self::Open,
    Self::Investigating,
    Self::Identified,
    Self::Monitoring,
    Self::Resolved,
    Self::Closed,
  ];

  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "open" => Some(Self::Open),
      "investigating" => Some(Self::Investigating),
      "identified" => Some(Self::Identified),
      "monitoring" => Some(Self::Monitoring),
      "resolved" => Some(Self::Resolved),
      "closed" => Some(Self::Closed),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Open => "open",
      Self::Investigating => "investigating",
      Self::Identified => "identified",
      Self::Monitoring => "monitoring",
      Self::Resolved => "resolved",
      Self::Closed => "closed",
    }
  }

  /// Not yet resolved or closed.
  pub fn is_active(self) -> bool {
    !self.is_terminal()
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Resolved | Self::Closed)
  }
}

impl TryFrom<String> for Status {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Status::from_str_loose(&value).ok_or_else(|| format!("unknown status {:?}", value))
  }
}

// ---------------------------------------------------------------------------
// Timeline + learnings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventType {
  Update,
  Action,
  Notification,
  Resolution,
}

impl TimelineEventType {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "update" => Some(Self::Update),
      "action" => Some(Self::Action),
      "notification" => Some(Self::Notification),
      "resolution" => Some(Self::Resolution),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEvent {
  pub id: String,
  pub timestamp: DateTime<Utc>,
  pub message: String,
  #[serde(rename = "type")]
  pub kind: TimelineEventType,
  pub user: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningCategory {
  WentWell,
  ToImprove,
  ActionItem,
}

impl LearningCategory {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
      "went_well" => Some(Self::WentWell),
      "to_improve" => Some(Self::ToImprove),
      "action_item" => Some(Self::ActionItem),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentLearning {
  pub id: String,
  pub category: LearningCategory,
  pub content: String,
  pub created_by: String,
  pub created_at: DateTime<Utc>,
}

/// Response metrics. Durations are minutes; every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentMetrics {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub time_to_acknowledge: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub time_to_resolve: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub affected_users: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub service_downtime: Option<u64>,
}

// ---------------------------------------------------------------------------
// Incident (validated record)
// ---------------------------------------------------------------------------

/// A validated incident. Only `normalize` builds these from external input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
  pub id: String,
  pub title: String,
  pub description: String,
  pub severity: Severity,
  pub status: Status,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub resolved_at: Option<DateTime<Utc>>,
  pub impacted_systems: Vec<String>,
  pub owner_team: String,
  pub tags: Vec<String>,
  pub timeline: Vec<TimelineEvent>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub metrics: Option<IncidentMetrics>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub learnings: Vec<IncidentLearning>,
}

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the data source sends)
// ---------------------------------------------------------------------------

/// One inbound incident record. Unknown fields are silently ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundIncident {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub description: String,
  pub severity: SeverityInput,
  pub status: String,
  pub created_at: String,
  pub updated_at: String,
  #[serde(default)]
  pub resolved_at: Option<String>,
  #[serde(default)]
  pub impacted_systems: Vec<String>,
  #[serde(default)]
  pub owner_team: String,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default)]
  pub timeline: Vec<InboundTimelineEvent>,
  #[serde(default)]
  pub metrics: Option<IncidentMetrics>,
  #[serde(default)]
  pub learnings: Vec<InboundLearning>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundTimelineEvent {
  pub id: String,
  pub timestamp: String,
  pub message: String,
  #[serde(rename = "type")]
  pub kind: String,
  #[serde(default)]
  pub user: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundLearning {
  pub id: String,
  pub category: String,
  pub content: String,
  #[serde(default)]
  pub created_by: String,
  pub created_at: String,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// One stdin line for the query binary.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
  pub incidents: Vec<InboundIncident>,
  #[serde(default)]
  pub filter: FilterSpec,
  #[serde(default)]
  pub sort: Option<SortSpec>,
  #[serde(default)]
  pub period: Option<Period>,
}

/// One stdout line for a successful query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
  pub incidents: Vec<Incident>,
  pub summary: DashboardSummary,
}

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
