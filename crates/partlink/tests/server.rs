//! REST endpoint tests driven through the router without a socket

mod common;

use axum::{
  body::{to_bytes, Body},
  http::{Request, StatusCode},
  Router,
};
use serde_json::Value;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use partlink::server::routing::create_router;
use partlink::{Catalog, Config};

use common::{sheet_path, write_fixture};

fn app(config: Config) -> (Router, Arc<Catalog>) {
  let catalog = Arc::new(Catalog::open(config).unwrap());
  (create_router(Arc::clone(&catalog)), catalog)
}

async fn call(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
  let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
  let response = app.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_status_reports_snapshot() {
  let temp = TempDir::new().unwrap();
  let (app, _) = app(write_fixture(temp.path()));

  let (status, body) = call(&app, "GET", "/status").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "healthy");
  assert_eq!(body["snapshot"]["version"], 1);
  assert_eq!(body["snapshot"]["records"], 4);
  assert!(body["transaction_id"].is_string());
}

#[tokio::test]
async fn test_code_lookup_exact_and_contains() {
  let temp = TempDir::new().unwrap();
  let (app, _) = app(write_fixture(temp.path()));

  let (status, body) = call(&app, "GET", "/parts/code/P1").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"]["kind"], "success");
  assert_eq!(body["count"], 2);
  assert_eq!(body["rows"][0]["model"], "TS3");
  assert_eq!(body["rows"][1]["recommendation"]["cn_spare_part_name"], "阀芯");

  let (_, body) = call(&app, "GET", "/parts/code/p?contains=true").await;
  assert_eq!(body["count"], 3);

  let (_, body) = call(&app, "GET", "/parts/code/NOPE").await;
  assert_eq!(body["status"]["kind"], "warning");
  assert_eq!(body["status"]["message"], "No spare parts found for code: NOPE");
  assert_eq!(body["rows"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_text_and_model_lookups() {
  let temp = TempDir::new().unwrap();
  let (app, _) = app(write_fixture(temp.path()));

  let (_, body) = call(&app, "GET", "/parts/search?q=rain").await;
  assert_eq!(body["count"], 2);

  let (_, body) = call(&app, "GET", "/parts/search").await;
  assert_eq!(body["status"]["kind"], "info");

  let (_, body) = call(&app, "GET", "/parts/model/TS3").await;
  let codes: Vec<&str> = body["rows"].as_array().unwrap().iter().map(|r| r["spare_part_code"].as_str().unwrap()).collect();
  assert_eq!(codes, vec!["P1", "T1"]);
}

#[tokio::test]
async fn test_categories_and_models() {
  let temp = TempDir::new().unwrap();
  let (app, _) = app(write_fixture(temp.path()));

  let (_, body) = call(&app, "GET", "/categories").await;
  assert_eq!(body["categories"], serde_json::json!(["All", "Shower", "Toilet"]));

  let (_, body) = call(&app, "GET", "/models?category=Toilet").await;
  assert_eq!(body["options"].as_array().unwrap().len(), 1);
  assert!(body.get("status").is_none());

  let (_, body) = call(&app, "GET", "/models?category=Toilet&keyword=rain").await;
  assert_eq!(body["options"].as_array().unwrap().len(), 0);
  assert_eq!(body["status"]["kind"], "info");
}

#[tokio::test]
async fn test_reload_publishes_new_snapshot() {
  let temp = TempDir::new().unwrap();
  let config = write_fixture(temp.path());
  let (app, catalog) = app(config.clone());

  fs::write(sheet_path(&config, "Toilet"), "Model,Spare part code\nTS3,T1\nTS3,T2\nTS3,T3\n").unwrap();

  let (status, body) = call(&app, "POST", "/reload").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["snapshot"]["version"], 2);
  assert_eq!(body["snapshot"]["records"], 5);
  assert_eq!(catalog.snapshot().version, 2);
}

#[tokio::test]
async fn test_failed_reload_keeps_serving() {
  let temp = TempDir::new().unwrap();
  let config = write_fixture(temp.path());
  let (app, catalog) = app(config.clone());

  fs::write(sheet_path(&config, "Shower"), "Model,Part\nX70,P1\n").unwrap();
  fs::write(sheet_path(&config, "Toilet"), "Model,Part\nTS3,T1\n").unwrap();

  let (status, body) = call(&app, "POST", "/reload").await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["errors"][0]["key"], "reload_failed");

  let (_, body) = call(&app, "GET", "/parts/code/P1").await;
  assert_eq!(body["count"], 2);
  assert_eq!(catalog.snapshot().version, 1);
}
