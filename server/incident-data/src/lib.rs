//! Incident Data Service
//!
//! HTTP boundary between the dashboard and the incident query engine. Serves
//! an in-memory mock collection with simulated latency.
//! Bind to 127.0.0.1 by default (internal only).

pub mod config;
pub mod error;
pub mod handlers;
pub mod params;
pub mod source;
pub mod state;

pub use config::ServiceConfig;
pub use error::DataError;
pub use source::{DataSource, InMemoryDataSource};
pub use state::AppState;

use std::sync::Arc;

use axum::{routing::get, routing::post, Router};
use tower_http::cors::CorsLayer;

pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(handlers::health))
    .route("/incidents", get(handlers::list_incidents))
    .route("/incidents/:id", get(handlers::get_incident))
    .route("/incidents/:id/timeline", post(handlers::append_timeline))
    .route("/incidents/:id/learnings", post(handlers::append_learning))
    .route("/metrics", get(handlers::metrics))
    .route("/groups/:dimension", get(handlers::groups))
    .layer(CorsLayer::permissive())
    .with_state(state)
}
