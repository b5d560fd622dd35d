//! Binary entrypoint: read JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is a QueryRequest. Each produces exactly one output line:
//! - A QueryResponse (sorted matches + dashboard summary)
//! - An ErrorOutput (when input parsing or validation fails)

use incident_query::types::{ErrorOutput, QueryRequest};
use incident_query::{Config, QueryError};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn main() {
  // Logs go to stderr; stdout carries only JSON lines.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .with_target(false)
    .compact()
    .init();

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  let config = Config::default();

  for line in stdin.lock().lines() {
    let line = match line {
      Ok(l) => l,
      Err(e) => {
        tracing::error!("read error: {}", e);
        std::process::exit(1);
      }
    };

    // Skip blank lines.
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let request: QueryRequest = match serde_json::from_str(trimmed) {
      Ok(v) => v,
      Err(e) => {
        tracing::warn!("rejected request line: {}", e);
        emit(&mut out, &ErrorOutput::new(format!("json parse: {}", e)));
        continue;
      }
    };

    match incident_query::run(&request, &config, chrono::Utc::now()) {
      Ok(response) => emit(&mut out, &response),
      Err(e) => {
        tracing::warn!("rejected request: {}", e);
        let err = match &e {
          QueryError::Validation { field, reason } => {
            ErrorOutput::new(reason.clone()).with_field(field.clone())
          }
          _ => ErrorOutput::new(e.to_string()),
        };
        emit(&mut out, &err);
      }
    }
  }

  let _ = out.flush();
}

fn emit<W: Write, T: serde::Serialize>(out: &mut W, value: &T) {
  let _ = serde_json::to_writer(&mut *out, value);
  let _ = writeln!(out);
}
