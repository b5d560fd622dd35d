//! Errors at the data-service boundary and their HTTP mapping.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use incident_query::types::ErrorOutput;
use incident_query::QueryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
  #[error("incident not found: {id}")]
  NotFound { id: String },

  #[error(transparent)]
  Query(#[from] QueryError),

  #[error("config: {0}")]
  Config(String),
}

impl DataError {
  pub fn not_found(id: &str) -> Self {
    Self::NotFound { id: id.to_string() }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::NotFound { .. } => StatusCode::NOT_FOUND,
      Self::Query(QueryError::Validation { .. }) => StatusCode::BAD_REQUEST,
      Self::Query(QueryError::Json(_)) | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for DataError {
  fn into_response(self) -> Response {
    let status = self.status();
    tracing::warn!(%status, "request failed: {}", self);
    let body = match &self {
      Self::Query(QueryError::Validation { field, reason }) => {
        ErrorOutput::new(reason.clone()).with_field(field.clone())
      }
      _ => ErrorOutput::new(self.to_string()),
    };
    (status, Json(body)).into_response()
  }
}
