//! Integration test: dashboard API endpoints

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use hr_attrition::server::{create_router, AppState, ServerConfig};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tower::ServiceExt;

fn shared_state() -> Arc<AppState> {
    static STATE: OnceLock<Arc<AppState>> = OnceLock::new();
    STATE
        .get_or_init(|| {
            let config = ServerConfig::default().with_host("127.0.0.1").with_port(0);
            Arc::new(AppState::new(config, common::dashboard_context(120)))
        })
        .clone()
}

fn test_app() -> axum::Router {
    create_router(shared_state())
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = test_app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send(get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["model"].is_string());
}

#[tokio::test]
async fn test_root_serves_html() {
    let response = test_app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Employee Attrition Analysis"));
}

#[tokio::test]
async fn test_kpis_endpoint() {
    let (status, body) = send(get("/api/kpis")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_employees"], 120);
    assert!(body["attrition_rate"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_options_endpoint() {
    let (status, body) = send(get("/api/options")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categorical"].as_array().unwrap().len(), 7);
    assert_eq!(body["numeric"][0]["field"], "Age");
}

#[tokio::test]
async fn test_predict_endpoint() {
    let profile = serde_json::to_value(common::sample_profile()).unwrap();
    let (status, body) = send(post_json("/api/predict", &profile)).await;

    assert_eq!(status, StatusCode::OK);
    let probability = body["probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&probability));
    assert!(matches!(body["risk"].as_str(), Some("Low" | "Medium" | "High")));
}

#[tokio::test]
async fn test_predict_out_of_range_is_bad_request() {
    let mut profile = serde_json::to_value(common::sample_profile()).unwrap();
    profile["Age"] = Value::from(12);
    let (status, body) = send(post_json("/api/predict", &profile)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_predict_malformed_body_is_bad_request() {
    let (status, body) = send(post_json("/api/predict", &serde_json::json!({ "Age": 30 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_chart_endpoints() {
    let (status, body) = send(get("/api/charts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["charts"].as_array().unwrap().len(), 6);

    let (status, body) = send(get("/api/charts/department")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "counts");
    assert_eq!(body["groups"].as_array().unwrap().len(), 3);

    let (status, body) = send(get("/api/charts/income")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "box");
}

#[tokio::test]
async fn test_unknown_chart_is_not_found() {
    let (status, body) = send(get("/api/charts/salary")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_model_endpoint() {
    let (status, body) = send(get("/api/model")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["report"]["candidates"].is_array());
    assert!(!body["feature_names"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (status, body) = send(get("/api/nonexistent")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let (status, _) = send(get("/api/predict")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_predictions_agree() {
    let profile = serde_json::to_value(common::sample_profile()).unwrap();
    let requests = (0..8).map(|_| send(post_json("/api/predict", &profile)));
    let responses = spawn_all(requests).await;

    let first = &responses[0].1;
    for (status, body) in &responses {
        assert_eq!(*status, StatusCode::OK);
        assert_eq!(body["probability"], first["probability"]);
    }
}

async fn spawn_all<F>(futures: impl Iterator<Item = F>) -> Vec<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    let handles: Vec<_> = futures.map(tokio::spawn).collect();
    let mut out = Vec::with_capacity(handles.len());
    for handle in handles {
        out.push(handle.await.unwrap());
    }
    out
}
