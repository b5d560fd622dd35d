//! Query-string parameters from the dashboard's filter controls.

use chrono::{DateTime, Utc};
use incident_query::{DateRange, FilterSpec, Period, QueryError, Severity, SortSpec, Status};
use serde::Deserialize;

/// `?search=db&severity=critical,2&status=open&team=Platform&from=...&to=...&sort=newest`
///
/// Multi-select values are comma-separated; an empty value means "no constraint".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentParams {
  pub search: Option<String>,
  pub severity: Option<String>,
  pub status: Option<String>,
  #[serde(rename = "type")]
  pub kind: Option<String>,
  pub team: Option<String>,
  pub from: Option<String>,
  pub to: Option<String>,
  pub sort: Option<String>,
}

impl IncidentParams {
  pub fn filter(&self) -> Result<FilterSpec, QueryError> {
    let severities = split(&self.severity)
      .map(|s| {
        Severity::from_str_loose(s)
          .ok_or_else(|| QueryError::validation("severity", &format!("unknown severity {:?}", s)))
      })
      .collect::<Result<Vec<_>, _>>()?;

    let statuses = split(&self.status)
      .map(|s| {
        Status::from_str_loose(s)
          .ok_or_else(|| QueryError::validation("status", &format!("unknown status {:?}", s)))
      })
      .collect::<Result<Vec<_>, _>>()?;

    let from = parse_opt("from", &self.from)?;
    let to = parse_opt("to", &self.to)?;
    let date_range = match (from, to) {
      (None, None) => None,
      (from, to) => Some(DateRange {
        from: from.unwrap_or(DateTime::<Utc>::MIN_UTC),
        to: to.unwrap_or(DateTime::<Utc>::MAX_UTC),
      }),
    };

    Ok(FilterSpec {
      search_text: self.search.clone(),
      severities,
      statuses,
      types: split(&self.kind).map(str::to_string).collect(),
      teams: split(&self.team).map(str::to_string).collect(),
      date_range,
    })
  }

  pub fn sort(&self, default: SortSpec) -> Result<SortSpec, QueryError> {
    match self.sort.as_deref() {
      Some(s) if !s.trim().is_empty() => s.parse(),
      _ => Ok(default),
    }
  }
}

/// Filter parameters plus the resolved-in-period window for `/metrics`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsParams {
  #[serde(flatten)]
  pub incidents: IncidentParams,
  pub period_start: Option<String>,
  pub period_end: Option<String>,
}

impl MetricsParams {
  /// Explicit bounds override the default window; a missing bound keeps the
  /// default's value for that end.
  pub fn period(&self, default: Period) -> Result<Period, QueryError> {
    Ok(Period {
      start: parse_opt("period_start", &self.period_start)?.unwrap_or(default.start),
      end: parse_opt("period_end", &self.period_end)?.unwrap_or(default.end),
    })
  }
}

fn split(value: &Option<String>) -> impl Iterator<Item = &str> {
  value
    .as_deref()
    .unwrap_or("")
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
}

fn parse_opt(field: &str, value: &Option<String>) -> Result<Option<DateTime<Utc>>, QueryError> {
  match value.as_deref().map(str::trim) {
    None | Some("") => Ok(None),
    Some(v) => DateTime::parse_from_rfc3339(v)
      .map(|dt| Some(dt.with_timezone(&Utc)))
      .map_err(|e| QueryError::validation(field, &format!("invalid RFC3339: {}", e))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn empty_params_are_an_empty_filter() {
    let filter = IncidentParams::default().filter().unwrap();
    assert!(filter.is_empty());
  }

  #[test]
  fn comma_lists_mix_names_and_ranks() {
    let params = IncidentParams {
      severity: Some("critical, 2,".into()),
      status: Some("open,monitoring".into()),
      team: Some("Platform".into()),
      ..IncidentParams::default()
    };
    let filter = params.filter().unwrap();
    assert_eq!(filter.severities, vec![Severity::Critical, Severity::High]);
    assert_eq!(filter.statuses, vec![Status::Open, Status::Monitoring]);
    assert_eq!(filter.teams, vec!["Platform".to_string()]);
  }

  #[test]
  fn unknown_values_name_the_field() {
    let params = IncidentParams {
      status: Some("pending".into()),
      ..IncidentParams::default()
    };
    assert_eq!(params.filter().unwrap_err().field(), Some("status"));

    let params = IncidentParams {
      from: Some("yesterday".into()),
      ..IncidentParams::default()
    };
    assert_eq!(params.filter().unwrap_err().field(), Some("from"));
  }

  #[test]
  fn open_ended_range() {
    let params = IncidentParams {
      from: Some("2023-09-01T00:00:00Z".into()),
      ..IncidentParams::default()
    };
    let range = params.filter().unwrap().date_range.unwrap();
    assert_eq!(range.from, Utc.with_ymd_and_hms(2023, 9, 1, 0, 0, 0).unwrap());
    assert_eq!(range.to, DateTime::<Utc>::MAX_UTC);
  }

  #[test]
  fn sort_falls_back_to_default() {
    let params = IncidentParams::default();
    assert_eq!(params.sort(SortSpec::Newest).unwrap(), SortSpec::Newest);
    let params = IncidentParams {
      sort: Some("bogus".into()),
      ..IncidentParams::default()
    };
    assert!(params.sort(SortSpec::default()).is_err());
  }

  #[test]
  fn metrics_period_overrides_default() {
    let default = Period {
      start: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
      end: Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap(),
    };
    let params = MetricsParams {
      period_start: Some("2023-06-01T00:00:00Z".into()),
      ..MetricsParams::default()
    };
    let period = params.period(default).unwrap();
    assert_eq!(period.start, Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap());
    assert_eq!(period.end, default.end);
  }
}
