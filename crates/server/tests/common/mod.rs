//! Common test utilities for API testing with mocks.
//!
//! Builds an in-process router around an orchestrator whose external steps
//! are `MockSteps`, with no settle delay, so whole workflows run in
//! milliseconds without any real service behind them.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use watchtower_core::testing::MockSteps;
use watchtower_core::{Config, OrchestratorConfig, TranslationItem, WorkflowOrchestrator};
use watchtower_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use watchtower_core::testing::fixtures;

/// In-process server with controllable external steps.
pub struct TestFixture {
    pub router: Router,
    /// Mock steps - queue scores, inject failures, hold calls
    pub mocks: MockSteps,
    /// Same orchestrator the router uses, for waiting on background runs
    pub orchestrator: WorkflowOrchestrator,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        let config = Config {
            orchestrator: OrchestratorConfig::immediate(),
            ..Default::default()
        };

        let mocks = MockSteps::new();
        let orchestrator =
            WorkflowOrchestrator::new(config.orchestrator.clone(), mocks.providers());
        let state = Arc::new(AppState::new(config, orchestrator.clone()));

        Self {
            router: create_router(state),
            mocks,
            orchestrator,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// GET a path and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Submit an item and return its id.
    pub async fn create(&self, key: &str, source_text: &str) -> String {
        let response = self
            .post(
                "/api/v1/items",
                serde_json::json!({
                    "key": key,
                    "source_text": source_text,
                    "context": "ui",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_str().unwrap().to_string()
    }

    /// Perform an action with no edits.
    pub async fn act(&self, id: &str, action: &str) -> TestResponse {
        self.post(
            &format!("/api/v1/items/{id}/actions"),
            serde_json::json!({ "action": action }),
        )
        .await
    }

    /// Wait for any background run on the item to finish.
    pub async fn settle(&self, id: &str) -> TranslationItem {
        fixtures::wait_for_idle(&self.orchestrator, id).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
