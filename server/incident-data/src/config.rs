//! Service configuration read from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use incident_query::config::MAX_RESOLVED_PERIOD_DAYS;
use incident_query::Config;

use crate::error::DataError;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
  pub bind_addr: IpAddr,
  pub port: u16,
  /// Artificial delay before every data-source call returns.
  pub latency: Duration,
  pub engine: Config,
}

impl Default for ServiceConfig {
  fn default() -> Self {
    Self {
      bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
      port: 5005,
      latency: Duration::from_millis(300),
      engine: Config::default(),
    }
  }
}

impl ServiceConfig {
  pub fn from_env() -> Result<Self, DataError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build from any key lookup; unset keys keep their defaults.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DataError> {
    let mut config = Self::default();
    if let Some(v) = lookup("BIND_ADDR") {
      config.bind_addr = parse("BIND_ADDR", &v)?;
    }
    if let Some(v) = lookup("PORT") {
      config.port = parse("PORT", &v)?;
    }
    if let Some(v) = lookup("MOCK_LATENCY_MS") {
      config.latency = Duration::from_millis(parse("MOCK_LATENCY_MS", &v)?);
    }
    if let Some(v) = lookup("RESOLVED_PERIOD_DAYS") {
      let days: i64 = parse("RESOLVED_PERIOD_DAYS", &v)?;
      if !(0..=MAX_RESOLVED_PERIOD_DAYS).contains(&days) {
        return Err(DataError::Config(format!(
          "RESOLVED_PERIOD_DAYS must be between 0 and {}: {}",
          MAX_RESOLVED_PERIOD_DAYS, days
        )));
      }
      config.engine.resolved_period_days = days;
    }
    Ok(config)
  }

  pub fn socket_addr(&self) -> SocketAddr {
    SocketAddr::new(self.bind_addr, self.port)
  }
}

fn parse<T>(key: &str, value: &str) -> Result<T, DataError>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  value
    .trim()
    .parse()
    .map_err(|e| DataError::Config(format!("{} must be valid ({}): {}", key, value, e)))
}
