//! Structured error types for the incident query engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl QueryError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  /// Offending field for validation errors, if any.
  pub fn field(&self) -> Option<&str> {
    match self {
      Self::Validation { field, .. } => Some(field),
      _ => None,
    }
  }
}
