//! Shared handler state.

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::source::DataSource;

pub struct AppState {
  pub source: Arc<dyn DataSource>,
  pub config: ServiceConfig,
}

impl AppState {
  pub fn new(source: Arc<dyn DataSource>, config: ServiceConfig) -> Self {
    Self { source, config }
  }
}
