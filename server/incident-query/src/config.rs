//! Engine configuration with sane defaults.

use chrono::{DateTime, Duration, Utc};

use crate::aggregate::Period;
use crate::query::SortSpec;

/// Longest resolved-period window accepted from configuration (~100 years).
pub const MAX_RESOLVED_PERIOD_DAYS: i64 = 36_500;

/// Defaults applied when a caller leaves a choice unspecified.
#[derive(Debug, Clone)]
pub struct Config {
  /// Order used when a request carries no explicit sort.
  pub default_sort: SortSpec,
  /// Length of the "resolved this period" window, in days, ending now.
  pub resolved_period_days: i64,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      default_sort: SortSpec::SeverityThenNewest,
      resolved_period_days: 30,
    }
  }
}

impl Config {
  /// Half-open window of `resolved_period_days` ending at `now`. A window
  /// reaching past the representable range starts at `DateTime::MIN_UTC`.
  pub fn period_ending(&self, now: DateTime<Utc>) -> Period {
    let start = Duration::try_days(self.resolved_period_days.max(0))
      .and_then(|window| now.checked_sub_signed(window))
      .unwrap_or(DateTime::<Utc>::MIN_UTC);
    Period { start, end: now }
  }
}
