//! In-process HTTP tests for the incident data service.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;

use incident_data::{router, AppState, InMemoryDataSource, ServiceConfig};

fn app() -> Router {
  let config = ServiceConfig {
    latency: Duration::ZERO,
    ..ServiceConfig::default()
  };
  let source = InMemoryDataSource::seeded(config.latency).unwrap();
  router(Arc::new(AppState::new(Arc::new(source), config)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
  let response = app.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
  send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
  let request = Request::post(uri)
    .header("content-type", "application/json")
    .body(Body::from(body.to_string()))
    .unwrap();
  send(app, request).await
}

fn ids(body: &Value) -> Vec<String> {
  body
    .as_array()
    .unwrap()
    .iter()
    .map(|i| i["id"].as_str().unwrap().to_string())
    .collect()
}

#[tokio::test]
async fn health_is_ok() {
  let response = app()
    .oneshot(Request::get("/health").body(Body::empty()).unwrap())
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn list_defaults_to_severity_then_newest() {
  let app = app();
  let (status, body) = get(&app, "/incidents").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    ids(&body),
    vec![
      "INC-2023-004",
      "INC-2023-001",
      "INC-2023-007",
      "INC-2023-005",
      "INC-2023-002",
      "INC-2023-006",
      "INC-2023-003",
    ]
  );
  // Canonical numeric severity on the wire.
  assert_eq!(body[0]["severity"], Value::from(1));
  assert_eq!(body[0]["ownerTeam"], Value::from("Infrastructure Team"));
}

#[tokio::test]
async fn critical_filter_over_http() {
  let app = app();
  let (status, body) = get(&app, "/incidents?severity=critical").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(ids(&body), vec!["INC-2023-004", "INC-2023-001"]);
}

#[tokio::test]
async fn search_team_and_sort_params() {
  let app = app();
  let (_, body) = get(&app, "/incidents?team=Platform&sort=oldest").await;
  assert_eq!(ids(&body), vec!["INC-2023-001", "INC-2023-007"]);

  let (_, body) = get(&app, "/incidents?search=LATENCY").await;
  assert_eq!(ids(&body), vec!["INC-2023-002"]);

  let (_, body) = get(
    &app,
    "/incidents?from=2023-09-01T00:00:00Z&to=2023-09-30T23:59:59Z&sort=id",
  )
  .await;
  assert_eq!(ids(&body), vec!["INC-2023-005", "INC-2023-006"]);
}

#[tokio::test]
async fn bad_params_are_400_with_field() {
  let app = app();
  let (status, body) = get(&app, "/incidents?status=pending").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], Value::Bool(true));
  assert_eq!(body["field"], Value::from("status"));

  let (status, _) = get(&app, "/incidents?sort=priority").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_incident_is_404() {
  let app = app();
  let (status, body) = get(&app, "/incidents/INC-1999-001").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["message"].as_str().unwrap().contains("INC-1999-001"));
}

#[tokio::test]
async fn append_timeline_then_refetch() {
  let app = app();
  let (status, body) = post_json(
    &app,
    "/incidents/INC-2023-004/timeline",
    serde_json::json!({"message": "Provider confirmed fiber cut", "type": "update", "user": "jon.berg"}),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let timeline = body["timeline"].as_array().unwrap();
  assert_eq!(timeline.len(), 3);
  assert_eq!(timeline[0]["id"], Value::from("evt-004-1"));
  assert_eq!(timeline[2]["type"], Value::from("update"));

  let (_, refetched) = get(&app, "/incidents/INC-2023-004").await;
  assert_eq!(refetched["timeline"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn append_learning_validates_category() {
  let app = app();
  let (status, body) = post_json(
    &app,
    "/incidents/INC-2023-002/learnings",
    serde_json::json!({"category": "blame", "content": "x", "createdBy": "li.wang"}),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["field"], Value::from("category"));

  let (status, body) = post_json(
    &app,
    "/incidents/INC-2023-002/learnings",
    serde_json::json!({"category": "action_item", "content": "Load test pool changes", "createdBy": "li.wang"}),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["learnings"][0]["category"], Value::from("action_item"));
}

#[tokio::test]
async fn metrics_summarize_filtered_snapshot() {
  let app = app();
  let (status, body) = get(
    &app,
    "/metrics?period_start=2023-09-01T00:00:00Z&period_end=2023-10-01T00:00:00Z",
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], Value::from(7));
  assert_eq!(body["active"], Value::from(4));
  assert_eq!(body["resolvedInPeriod"], Value::from(1));
  assert_eq!(body["bySeverity"]["1"], Value::from(2));
  assert_eq!(body["bySeverity"]["5"], Value::from(0));
  assert_eq!(body["byStatus"]["closed"], Value::from(1));

  let (_, body) = get(&app, "/metrics?severity=critical").await;
  assert_eq!(body["total"], Value::from(2));
  assert_eq!(body["byStatus"].as_object().unwrap().len(), 6);
}

#[tokio::test]
async fn groups_by_team_and_tag() {
  let app = app();
  let (status, body) = get(&app, "/groups/team?sort=id").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    body["Platform Team"],
    serde_json::json!(["INC-2023-001", "INC-2023-007"])
  );

  let (_, body) = get(&app, "/groups/tag?sort=id").await;
  assert_eq!(body["outage"], serde_json::json!(["INC-2023-001", "INC-2023-004"]));

  let (status, _) = get(&app, "/groups/owner").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}
